//! Shard decoder, versions 3 through 12.
//!
//! Wire layout (all integers little-endian, `v…` = only those versions):
//!
//! ```text
//! magic[4] = "STRI"
//! version[1]
//! scale            = uint24 (v5+) | int32 (v3,4)
//! placeNodeTable   = varint count + entries
//! placeCityTable   = varint count + entries
//!     entries v9+  = (varint prefixLen, varint suffixLen, suffix bytes)*
//!     entries v<9  = (varint len, bytes)*
//! locations (v3,4,5)
//!     varint count + ((int32|int24) lon, (int32|int24) lat,
//!                     varint nodeIdx, varint cityIdx)*
//! labelTable (v4)  = varint count + (varint len, bytes)*
//! varint nodeCount
//! v7+ (LOUDS):
//!     varint bitCount, ceil(bitCount/8) bitmap bytes (LSB-first),
//!     varint edgeCount, edgeCount * (varint len, bytes),
//!     per node: varint valueCount, valueCount * value record,
//!     trailing half-byte flush in v11 when the value total is odd
//! v<7 (explicit):
//!     per node: varint edgeCount,
//!               edgeCount * ((v4 varint labelIdx | varint len + bytes),
//!                            varint child),
//!               varint valueCount,
//!               valueCount * (v6 inline record | varint locationIdx)
//! ```
//!
//! A value record is `int24 lon, int24 lat, varint nodeIdx, varint cityIdx`
//! followed by the version's kind suffix: nothing (v6, v7, v9), a kind byte
//! (v10), one nibble packed pairwise across the whole value stream (v11), or
//! a kind/population-bucket nibble pair (v12).

use super::cursor::Cursor;
use super::types::{Location, PlaceKind, Shard, TrieEdge, TrieNode, TrieValue};
use super::ShardError;

/// First four bytes of every shard file.
pub const SHARD_MAGIC: &[u8; 4] = b"STRI";

/// Format versions this decoder accepts. Version 8 was never shipped.
pub const SUPPORTED_VERSIONS: &[u8] = &[3, 4, 5, 6, 7, 9, 10, 11, 12];

/// Decode a shard buffer into its in-memory form.
///
/// The buffer must already be decompressed; gzip sniffing happens in the
/// shard manager. Fails with [`ShardError::BadMagic`] /
/// [`ShardError::UnsupportedVersion`] on foreign input and
/// [`ShardError::BadFormat`] (with the byte offset) on anything structurally
/// inconsistent: truncated reads, invalid UTF-8, out-of-range indices, kind
/// codes above 15, or a LOUDS bitmap that disagrees with its edge count.
pub fn decode_shard(data: &[u8]) -> Result<Shard, ShardError> {
    let mut cur = Cursor::new(data);

    if cur.read_exact(4).map_err(|_| ShardError::BadMagic)? != SHARD_MAGIC {
        return Err(ShardError::BadMagic);
    }
    let version = cur.read_u8().map_err(|_| ShardError::BadMagic)?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ShardError::UnsupportedVersion(version));
    }

    let scale = match version {
        3 | 4 => i64::from(cur.read_i32()?),
        _ => i64::from(cur.read_u24()?),
    };
    if scale <= 0 {
        return Err(ShardError::BadFormat {
            offset: cur.offset(),
            message: format!("scale must be positive, got {}", scale),
        });
    }
    let scale = scale as f64;

    let place_nodes = read_name_table(&mut cur, version)?;
    let place_cities = read_name_table(&mut cur, version)?;

    let locations = if version <= 5 {
        read_location_array(&mut cur, version, scale, &place_nodes, &place_cities)?
    } else {
        Vec::new()
    };

    let labels = if version == 4 {
        read_label_table(&mut cur)?
    } else {
        Vec::new()
    };

    let node_count = cur.read_varint()? as usize;
    if node_count == 0 {
        return Err(ShardError::BadFormat {
            offset: cur.offset(),
            message: "shard has no trie nodes".into(),
        });
    }

    let nodes = if version >= 7 {
        read_louds_nodes(
            &mut cur,
            version,
            node_count,
            scale,
            place_nodes.len(),
            place_cities.len(),
        )?
    } else {
        read_explicit_nodes(
            &mut cur,
            version,
            node_count,
            scale,
            &labels,
            locations.len(),
            place_nodes.len(),
            place_cities.len(),
        )?
    };

    let location_count = if version <= 5 {
        locations.len()
    } else {
        nodes.iter().map(|n| n.values.len()).sum()
    };

    Ok(Shard {
        version,
        scale,
        place_nodes,
        place_cities,
        locations,
        nodes,
        location_count,
    })
}

/// Place-name table: prefix-compressed from version 9, plain before.
fn read_name_table(cur: &mut Cursor<'_>, version: u8) -> Result<Vec<String>, ShardError> {
    let count = cur.read_varint()? as usize;
    if version >= 9 {
        cur.read_prefix_table(count)
    } else {
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(cur.read_utf8()?);
        }
        Ok(entries)
    }
}

/// Standalone location array, versions 3 to 5. Coordinates are int32 in
/// versions 3 and 4, int24 in version 5.
fn read_location_array(
    cur: &mut Cursor<'_>,
    version: u8,
    scale: f64,
    place_nodes: &[String],
    place_cities: &[String],
) -> Result<Vec<Location>, ShardError> {
    let count = cur.read_varint()? as usize;
    let mut locations = Vec::with_capacity(count);
    for _ in 0..count {
        let (lon_i, lat_i) = if version == 5 {
            (cur.read_i24()?, cur.read_i24()?)
        } else {
            (cur.read_i32()?, cur.read_i32()?)
        };
        let node_idx = cur.read_varint()?;
        let city_idx = cur.read_varint()?;
        check_place_refs(cur, node_idx, city_idx, place_nodes.len(), place_cities.len())?;
        locations.push(Location {
            lon: f64::from(lon_i) / scale,
            lat: f64::from(lat_i) / scale,
            node_idx,
            city_idx,
            kind: PlaceKind::Street,
            population_bucket: 0,
        });
    }
    Ok(locations)
}

/// Edge-label interning table, version 4 only.
fn read_label_table(cur: &mut Cursor<'_>) -> Result<Vec<String>, ShardError> {
    let count = cur.read_varint()? as usize;
    let mut labels = Vec::with_capacity(count);
    for _ in 0..count {
        labels.push(cur.read_utf8()?);
    }
    Ok(labels)
}

fn check_place_refs(
    cur: &Cursor<'_>,
    node_idx: u32,
    city_idx: u32,
    node_count: usize,
    city_count: usize,
) -> Result<(), ShardError> {
    if node_idx as usize >= node_count {
        return Err(ShardError::BadFormat {
            offset: cur.offset(),
            message: format!("place node index {} out of range", node_idx),
        });
    }
    if city_idx as usize >= city_count {
        return Err(ShardError::BadFormat {
            offset: cur.offset(),
            message: format!("place city index {} out of range", city_idx),
        });
    }
    Ok(())
}

/// Explicit node blocks, versions 3 to 6: every node spells out its edges.
#[allow(clippy::too_many_arguments)]
fn read_explicit_nodes(
    cur: &mut Cursor<'_>,
    version: u8,
    node_count: usize,
    scale: f64,
    labels: &[String],
    location_count: usize,
    place_node_count: usize,
    place_city_count: usize,
) -> Result<Vec<TrieNode>, ShardError> {
    let mut nodes = Vec::with_capacity(node_count);
    for i in 0..node_count {
        let edge_count = cur.read_varint()? as usize;
        let mut edges = Vec::with_capacity(edge_count);
        for _ in 0..edge_count {
            let label = if version == 4 {
                let idx = cur.read_varint()? as usize;
                labels
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| ShardError::BadFormat {
                        offset: cur.offset(),
                        message: format!("edge label index {} out of range", idx),
                    })?
            } else {
                cur.read_utf8()?
            };
            let child = cur.read_varint()?;
            if child as usize >= node_count {
                return Err(ShardError::BadFormat {
                    offset: cur.offset(),
                    message: format!("edge child {} out of range", child),
                });
            }
            if child as usize <= i {
                return Err(ShardError::BadFormat {
                    offset: cur.offset(),
                    message: format!("edge child {} does not descend from node {}", child, i),
                });
            }
            edges.push(TrieEdge { label, child });
        }

        let value_count = cur.read_varint()? as usize;
        let mut values = Vec::with_capacity(value_count);
        for _ in 0..value_count {
            if version == 6 {
                let lon_i = cur.read_i24()?;
                let lat_i = cur.read_i24()?;
                let node_idx = cur.read_varint()?;
                let city_idx = cur.read_varint()?;
                check_place_refs(cur, node_idx, city_idx, place_node_count, place_city_count)?;
                values.push(TrieValue::Inline(Location {
                    lon: f64::from(lon_i) / scale,
                    lat: f64::from(lat_i) / scale,
                    node_idx,
                    city_idx,
                    kind: PlaceKind::Street,
                    population_bucket: 0,
                }));
            } else {
                let idx = cur.read_varint()?;
                if idx as usize >= location_count {
                    return Err(ShardError::BadFormat {
                        offset: cur.offset(),
                        message: format!("location index {} out of range", idx),
                    });
                }
                values.push(TrieValue::Indirect(idx));
            }
        }
        nodes.push(TrieNode { edges, values });
    }
    Ok(nodes)
}

/// LOUDS node blocks, versions 7 and up.
///
/// Bits are read LSB-first within each byte. A `1` appends an edge to the
/// current node whose child is the running edge ordinal plus one; a `0`
/// advances to the next node. Encoders may omit the final terminator bit, so
/// the walk clamps at `node_count` instead of requiring it.
fn read_louds_nodes(
    cur: &mut Cursor<'_>,
    version: u8,
    node_count: usize,
    scale: f64,
    place_node_count: usize,
    place_city_count: usize,
) -> Result<Vec<TrieNode>, ShardError> {
    let bit_count = cur.read_varint()? as usize;
    let bitmap_start = cur.offset();
    let bitmap = cur.read_exact(bit_count.div_ceil(8))?;

    let edge_count = cur.read_varint()? as usize;
    let mut labels = Vec::with_capacity(edge_count);
    for _ in 0..edge_count {
        labels.push(cur.read_utf8()?);
    }

    let mut nodes = vec![TrieNode::default(); node_count];
    let mut label_iter = labels.into_iter();
    let mut node_cursor = 0usize;
    let mut edge_cursor = 0usize;
    for bit_idx in 0..bit_count {
        if node_cursor >= node_count {
            break;
        }
        if (bitmap[bit_idx / 8] >> (bit_idx & 7)) & 1 == 1 {
            let child = edge_cursor + 1;
            if child >= node_count {
                return Err(ShardError::BadFormat {
                    offset: bitmap_start,
                    message: format!("trie bitmap references child {} out of range", child),
                });
            }
            let label = label_iter.next().ok_or_else(|| ShardError::BadFormat {
                offset: bitmap_start,
                message: "trie bitmap has more edges than labels".into(),
            })?;
            nodes[node_cursor].edges.push(TrieEdge {
                label,
                child: child as u32,
            });
            edge_cursor += 1;
        } else {
            node_cursor += 1;
        }
    }
    if edge_cursor != edge_count {
        return Err(ShardError::BadFormat {
            offset: bitmap_start,
            message: format!(
                "trie bitmap yields {} edges, label table has {}",
                edge_cursor, edge_count
            ),
        });
    }

    read_louds_values(
        cur,
        version,
        &mut nodes,
        scale,
        place_node_count,
        place_city_count,
    )?;
    Ok(nodes)
}

/// Per-node value records for LOUDS shards, including the version-specific
/// kind suffix.
///
/// Version 11 packs kinds as nibbles, two values per byte, paired in
/// encounter order across the entire node sequence. The byte is read at the
/// second value of each pair: its low nibble belongs to the earlier value,
/// its high nibble to the later one. An odd total is flushed with one extra
/// byte whose high nibble is discarded.
fn read_louds_values(
    cur: &mut Cursor<'_>,
    version: u8,
    nodes: &mut [TrieNode],
    scale: f64,
    place_node_count: usize,
    place_city_count: usize,
) -> Result<(), ShardError> {
    // Position of the value still waiting for its kind nibble (v11).
    let mut pending: Option<(usize, usize)> = None;

    for node_i in 0..nodes.len() {
        let value_count = cur.read_varint()? as usize;
        for _ in 0..value_count {
            let lon_i = cur.read_i24()?;
            let lat_i = cur.read_i24()?;
            let node_idx = cur.read_varint()?;
            let city_idx = cur.read_varint()?;
            check_place_refs(cur, node_idx, city_idx, place_node_count, place_city_count)?;

            let (kind, population_bucket) = match version {
                10 => {
                    let code = cur.read_u8()?;
                    let kind = PlaceKind::from_code(code).ok_or_else(|| ShardError::BadFormat {
                        offset: cur.offset(),
                        message: format!("kind code {} out of range", code),
                    })?;
                    (kind, 0)
                }
                11 => match pending.take() {
                    Some((pn, pv)) => {
                        let byte = cur.read_u8()?;
                        set_inline_kind(nodes, pn, pv, PlaceKind::from_nibble(byte));
                        (PlaceKind::from_nibble(byte >> 4), 0)
                    }
                    None => {
                        pending = Some((node_i, nodes[node_i].values.len()));
                        (PlaceKind::Street, 0)
                    }
                },
                12 => {
                    let byte = cur.read_u8()?;
                    (PlaceKind::from_nibble(byte), byte >> 4)
                }
                // Versions 7 and 9 carry no kind; everything is a street.
                _ => (PlaceKind::Street, 0),
            };

            nodes[node_i].values.push(TrieValue::Inline(Location {
                lon: f64::from(lon_i) / scale,
                lat: f64::from(lat_i) / scale,
                node_idx,
                city_idx,
                kind,
                population_bucket,
            }));
        }
    }

    if let Some((pn, pv)) = pending {
        let byte = cur.read_u8()?;
        set_inline_kind(nodes, pn, pv, PlaceKind::from_nibble(byte));
    }
    Ok(())
}

fn set_inline_kind(nodes: &mut [TrieNode], node: usize, value: usize, kind: PlaceKind) {
    if let TrieValue::Inline(location) = &mut nodes[node].values[value] {
        location.kind = kind;
    }
}
