//! External JSON connection-graph format.
use std::collections::BTreeMap;

use egp_error::CoreError;
use egp_types::TypeRegistry;

use crate::endpoint_ref::EndpointRef;
use crate::error::{GraphError, Result};
use crate::interface::Interface;
use crate::row::{Class, InterfaceKey, Row};

/// Parses the external `{dst_row: [[src_row, src_idx, type_name], ...]}`
/// format (plus optional `U`) into the internal interface map.
pub fn json_cgraph_to_interfaces(
    json: &serde_json::Value,
    registry: &TypeRegistry,
) -> Result<BTreeMap<InterfaceKey, Interface>> {
    let obj = json
        .as_object()
        .ok_or_else(|| GraphError::Core(CoreError::GraphShape("expected a JSON object".into())))?;

    let mut dest_interfaces: BTreeMap<Row, Interface> = BTreeMap::new();
    // (src_row, src_idx) -> (type uid, [dst refs that point back at it])
    let mut src_map: BTreeMap<(Row, u8), (i32, Vec<EndpointRef>)> = BTreeMap::new();

    for (key, value) in obj {
        if key == "U" {
            continue;
        }
        let dst_row = parse_row_key(key)?;
        if !dst_row.is_valid_dest() {
            return Err(GraphError::Core(CoreError::GraphShape(format!(
                "'{dst_row}' is not a valid destination row"
            ))));
        }
        let triples = value.as_array().ok_or_else(|| {
            GraphError::Core(CoreError::GraphShape(format!(
                "destination row {dst_row} must map to an array of triples"
            )))
        })?;

        let mut iface = Interface::new(dst_row, Class::Dst);
        for triple in triples {
            let (src_row, src_idx, type_name) = parse_triple(triple)?;
            if !src_row.is_valid_source() {
                return Err(GraphError::Core(CoreError::GraphShape(format!(
                    "'{src_row}' is not a valid source row"
                ))));
            }
            let td = registry.get(type_name.as_str()).map_err(|_| {
                GraphError::Core(CoreError::NotFound {
                    what: "TypeDef",
                    id: type_name.clone(),
                })
            })?;

            let dst_idx = iface.append(td.uid)?;
            iface
                .get_mut(dst_idx)
                .expect("just appended")
                .connect(EndpointRef::new(src_row, src_idx));

            record_source(&mut src_map, src_row, src_idx, td.uid, EndpointRef::new(dst_row, dst_idx))?;
        }
        dest_interfaces.insert(dst_row, iface);
    }

    if let Some(u_val) = obj.get("U") {
        let triples = u_val.as_array().ok_or_else(|| {
            GraphError::Core(CoreError::GraphShape("U must map to an array of triples".into()))
        })?;
        for triple in triples {
            let (src_row, src_idx, type_name) = parse_triple(triple)?;
            if !src_row.is_valid_source() {
                return Err(GraphError::Core(CoreError::GraphShape(format!(
                    "'{src_row}' is not a valid source row"
                ))));
            }
            let td = registry.get(type_name.as_str()).map_err(|_| {
                GraphError::Core(CoreError::NotFound {
                    what: "TypeDef",
                    id: type_name.clone(),
                })
            })?;
            src_map
                .entry((src_row, src_idx))
                .or_insert_with(|| (td.uid, Vec::new()));
        }
    }

    let mut grouped: BTreeMap<Row, Vec<(u8, i32, Vec<EndpointRef>)>> = BTreeMap::new();
    for ((row, idx), (typ, refs)) in src_map {
        grouped.entry(row).or_default().push((idx, typ, refs));
    }

    let mut src_interfaces: BTreeMap<Row, Interface> = BTreeMap::new();
    for (row, mut items) in grouped {
        items.sort_by_key(|(idx, _, _)| *idx);
        let mut iface = Interface::new(row, Class::Src);
        for (_, typ, refs) in items {
            let new_idx = iface.append(typ)?;
            let ep = iface.get_mut(new_idx).expect("just appended");
            for r in refs {
                ep.connect(r);
            }
        }
        src_interfaces.insert(row, iface);
    }

    let mut result: BTreeMap<InterfaceKey, Interface> = BTreeMap::new();
    result.insert(
        (Row::I, Class::Src),
        src_interfaces
            .remove(&Row::I)
            .unwrap_or_else(|| Interface::new(Row::I, Class::Src)),
    );
    result.insert(
        (Row::O, Class::Dst),
        dest_interfaces
            .remove(&Row::O)
            .unwrap_or_else(|| Interface::new(Row::O, Class::Dst)),
    );
    for (row, iface) in dest_interfaces {
        result.insert((row, Class::Dst), iface);
    }
    for (row, iface) in src_interfaces {
        result.insert((row, Class::Src), iface);
    }

    ensure_pair(&mut result, Row::A, Row::A);
    ensure_pair(&mut result, Row::B, Row::B);
    ensure_triple(&mut result, Row::S, Row::S, Row::T);
    ensure_triple(&mut result, Row::W, Row::W, Row::X);
    if [Row::F, Row::L, Row::S, Row::W]
        .iter()
        .any(|r| result.contains_key(&(*r, Class::Dst)))
    {
        result
            .entry((Row::P, Class::Dst))
            .or_insert_with(|| Interface::new(Row::P, Class::Dst));
    }

    Ok(result)
}

fn record_source(
    src_map: &mut BTreeMap<(Row, u8), (i32, Vec<EndpointRef>)>,
    src_row: Row,
    src_idx: u8,
    typ: i32,
    dst_ref: EndpointRef,
) -> Result<()> {
    match src_map.get_mut(&(src_row, src_idx)) {
        Some((existing_typ, refs)) => {
            if *existing_typ != typ {
                return Err(GraphError::Core(CoreError::TypeInconsistency(format!(
                    "{src_row}{src_idx:03} assigned conflicting types {existing_typ} and {typ}"
                ))));
            }
            refs.push(dst_ref);
        }
        None => {
            src_map.insert((src_row, src_idx), (typ, vec![dst_ref]));
        }
    }
    Ok(())
}

fn ensure_pair(result: &mut BTreeMap<InterfaceKey, Interface>, src_row: Row, dst_row: Row) {
    let src_exists = result.contains_key(&(src_row, Class::Src));
    let dst_exists = result.contains_key(&(dst_row, Class::Dst));
    if src_exists && !dst_exists {
        result.insert((dst_row, Class::Dst), Interface::new(dst_row, Class::Dst));
    }
    if dst_exists && !src_exists {
        result.insert((src_row, Class::Src), Interface::new(src_row, Class::Src));
    }
}

/// `Sd`/`Ss`/`Td` (or `Wd`/`Ws`/`Xd`) co-exist as a triple: if any is
/// present, insert the other two as empty.
fn ensure_triple(result: &mut BTreeMap<InterfaceKey, Interface>, src_row: Row, dst_row: Row, alt_dst_row: Row) {
    let any = result.contains_key(&(src_row, Class::Src))
        || result.contains_key(&(dst_row, Class::Dst))
        || result.contains_key(&(alt_dst_row, Class::Dst));
    if !any {
        return;
    }
    result
        .entry((src_row, Class::Src))
        .or_insert_with(|| Interface::new(src_row, Class::Src));
    result
        .entry((dst_row, Class::Dst))
        .or_insert_with(|| Interface::new(dst_row, Class::Dst));
    result
        .entry((alt_dst_row, Class::Dst))
        .or_insert_with(|| Interface::new(alt_dst_row, Class::Dst));
}

fn parse_row_key(key: &str) -> Result<Row> {
    let mut chars = key.chars();
    let c = chars.next().ok_or_else(|| {
        GraphError::Core(CoreError::GraphShape("empty row key".into()))
    })?;
    if chars.next().is_some() {
        return Err(GraphError::Core(CoreError::GraphShape(format!(
            "row key '{key}' must be a single character"
        ))));
    }
    Row::from_char(c)
}

fn parse_triple(value: &serde_json::Value) -> Result<(Row, u8, String)> {
    let arr = value.as_array().ok_or_else(|| {
        GraphError::Core(CoreError::GraphShape(
            "expected a [src_row, src_idx, type_name] triple".into(),
        ))
    })?;
    if arr.len() != 3 {
        return Err(GraphError::Core(CoreError::GraphShape(format!(
            "triple must have exactly 3 elements, got {}",
            arr.len()
        ))));
    }
    let src_row_str = arr[0]
        .as_str()
        .ok_or_else(|| GraphError::Core(CoreError::GraphShape("src_row must be a string".into())))?;
    let src_row = parse_row_key(src_row_str)?;
    let src_idx = arr[1]
        .as_u64()
        .ok_or_else(|| GraphError::Core(CoreError::GraphShape("src_idx must be an integer".into())))?;
    if src_idx >= 256 {
        return Err(GraphError::Core(CoreError::IndexOutOfRange {
            row: src_row.to_string(),
            idx: src_idx as u16,
            len: 0,
        }));
    }
    let type_name = arr[2]
        .as_str()
        .ok_or_else(|| GraphError::Core(CoreError::GraphShape("type_name must be a string".into())))?
        .to_string();
    Ok((src_row, src_idx as u8, type_name))
}

/// Canonical JSON form: a mapping from destination-row
/// character to `[src_row, src_idx, type_name]` triples in endpoint index
/// order, plus a synthetic `U` row of every unconnected source endpoint
/// sorted by `src_row + f"{src_idx:03d}"`.
pub fn interfaces_to_json(
    interfaces: &BTreeMap<InterfaceKey, Interface>,
    registry: &TypeRegistry,
) -> Result<serde_json::Value> {
    let mut obj = serde_json::Map::new();
    for ((row, cls), iface) in interfaces {
        if *cls != Class::Dst {
            continue;
        }
        obj.insert(row.to_string(), iface.to_json(registry, true)?);
    }

    let mut leftovers: Vec<(Row, u8, String)> = Vec::new();
    for ((row, cls), iface) in interfaces {
        if *cls != Class::Src {
            continue;
        }
        for ep in iface.iter() {
            if ep.is_connected() {
                continue;
            }
            let type_name = registry
                .get(ep.typ)
                .map_err(|_| {
                    GraphError::Core(CoreError::NotFound {
                        what: "TypeDef",
                        id: ep.typ.to_string(),
                    })
                })?
                .name
                .to_string();
            leftovers.push((*row, ep.idx, type_name));
        }
    }
    leftovers.sort_by(|a, b| {
        (a.0.to_string(), format!("{:03}", a.1)).cmp(&(b.0.to_string(), format!("{:03}", b.1)))
    });
    obj.insert(
        "U".to_string(),
        serde_json::Value::Array(
            leftovers
                .into_iter()
                .map(|(row, idx, type_name)| serde_json::json!([row.to_string(), idx, type_name]))
                .collect(),
        ),
    );

    Ok(serde_json::Value::Object(obj))
}
