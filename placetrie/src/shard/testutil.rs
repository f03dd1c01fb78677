//! Test fixtures: assemble shard byte images for every supported format
//! version, plus helpers for building in-memory tries directly.

use std::io::Write;

use super::types::{Location, PlaceKind, Shard, TrieNode, TrieValue};

/// A value as it will be written to the byte image.
#[derive(Debug, Clone)]
pub(crate) enum RawValue {
    Index(u32),
    Inline {
        lon: i64,
        lat: i64,
        node_idx: u32,
        city_idx: u32,
        kind: u8,
        pop: u8,
    },
}

impl RawValue {
    pub(crate) fn inline(lon: i64, lat: i64, node_idx: u32, city_idx: u32) -> Self {
        Self::inline_full(lon, lat, node_idx, city_idx, 0, 0)
    }

    pub(crate) fn inline_kind(lon: i64, lat: i64, node_idx: u32, city_idx: u32, kind: u8) -> Self {
        Self::inline_full(lon, lat, node_idx, city_idx, kind, 0)
    }

    pub(crate) fn inline_full(
        lon: i64,
        lat: i64,
        node_idx: u32,
        city_idx: u32,
        kind: u8,
        pop: u8,
    ) -> Self {
        RawValue::Inline {
            lon,
            lat,
            node_idx,
            city_idx,
            kind,
            pop,
        }
    }
}

/// A trie node as it will be written to the byte image.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawNode {
    pub edges: Vec<(String, u32)>,
    pub values: Vec<RawValue>,
}

impl RawNode {
    pub(crate) fn root(edges: &[(&str, u32)]) -> Self {
        RawNode {
            edges: edges.iter().map(|(l, c)| (l.to_string(), *c)).collect(),
            values: vec![],
        }
    }

    pub(crate) fn leaf(values: &[RawValue]) -> Self {
        RawNode {
            edges: vec![],
            values: values.to_vec(),
        }
    }
}

/// Builder for a complete shard byte image at a chosen version.
///
/// For LOUDS versions (7+) the nodes must already be numbered in level order
/// with children 1..=E in edge-encounter order, matching what the offline
/// builder emits.
#[derive(Debug, Clone)]
pub(crate) struct ShardImage {
    version: u8,
    scale: i64,
    place_nodes: Vec<String>,
    place_cities: Vec<String>,
    locations: Vec<(i64, i64, u32, u32)>,
    labels: Vec<String>,
    nodes: Vec<RawNode>,
    /// Drop the final LOUDS terminator bit (decoders must tolerate this).
    pub omit_final_terminator: bool,
    /// Write one fewer edge label than the bitmap implies.
    pub drop_last_edge_label: bool,
    /// Force every v4 edge to reference this label-table index.
    pub label_index_override: Option<u32>,
}

impl ShardImage {
    pub(crate) fn new(version: u8) -> Self {
        ShardImage {
            version,
            scale: 10_000_000,
            place_nodes: vec![],
            place_cities: vec![],
            locations: vec![],
            labels: vec![],
            nodes: vec![],
            omit_final_terminator: false,
            drop_last_edge_label: false,
            label_index_override: None,
        }
    }

    pub(crate) fn with_scale(mut self, scale: i64) -> Self {
        self.scale = scale;
        self
    }

    pub(crate) fn with_place_nodes(mut self, names: &[&str]) -> Self {
        self.place_nodes = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn with_place_cities(mut self, names: &[&str]) -> Self {
        self.place_cities = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn with_location(mut self, lon: i64, lat: i64, node_idx: u32, city_idx: u32) -> Self {
        self.locations.push((lon, lat, node_idx, city_idx));
        self
    }

    pub(crate) fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn with_node(mut self, node: RawNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(super::SHARD_MAGIC);
        buf.push(self.version);

        if self.version <= 4 {
            buf.extend_from_slice(&(self.scale as i32).to_le_bytes());
        } else {
            push_u24(&mut buf, self.scale as u32);
        }

        self.write_name_table(&mut buf, &self.place_nodes);
        self.write_name_table(&mut buf, &self.place_cities);

        if self.version <= 5 {
            push_varint(&mut buf, self.locations.len() as u32);
            for (lon, lat, node_idx, city_idx) in &self.locations {
                if self.version == 5 {
                    push_i24(&mut buf, *lon as i32);
                    push_i24(&mut buf, *lat as i32);
                } else {
                    buf.extend_from_slice(&(*lon as i32).to_le_bytes());
                    buf.extend_from_slice(&(*lat as i32).to_le_bytes());
                }
                push_varint(&mut buf, *node_idx);
                push_varint(&mut buf, *city_idx);
            }
        }

        if self.version == 4 {
            push_varint(&mut buf, self.labels.len() as u32);
            for label in &self.labels {
                push_str(&mut buf, label);
            }
        }

        push_varint(&mut buf, self.nodes.len() as u32);
        if self.version >= 7 {
            self.write_louds_nodes(&mut buf);
        } else {
            self.write_explicit_nodes(&mut buf);
        }
        buf
    }

    fn write_name_table(&self, buf: &mut Vec<u8>, entries: &[String]) {
        push_varint(buf, entries.len() as u32);
        if self.version >= 9 {
            let mut prev = "";
            for entry in entries {
                let prefix_len = common_prefix_len(prev, entry);
                push_varint(buf, prefix_len as u32);
                let suffix = &entry.as_bytes()[prefix_len..];
                push_varint(buf, suffix.len() as u32);
                buf.extend_from_slice(suffix);
                prev = entry;
            }
        } else {
            for entry in entries {
                push_str(buf, entry);
            }
        }
    }

    fn write_explicit_nodes(&self, buf: &mut Vec<u8>) {
        for node in &self.nodes {
            push_varint(buf, node.edges.len() as u32);
            for (label, child) in &node.edges {
                if self.version == 4 {
                    let idx = self.label_index_override.unwrap_or_else(|| {
                        self.labels
                            .iter()
                            .position(|l| l == label)
                            .expect("edge label missing from label table") as u32
                    });
                    push_varint(buf, idx);
                } else {
                    push_str(buf, label);
                }
                push_varint(buf, *child);
            }
            push_varint(buf, node.values.len() as u32);
            for value in &node.values {
                match value {
                    RawValue::Index(idx) => push_varint(buf, *idx),
                    RawValue::Inline {
                        lon,
                        lat,
                        node_idx,
                        city_idx,
                        ..
                    } => {
                        assert_eq!(self.version, 6, "explicit blocks inline values only in v6");
                        push_i24(buf, *lon as i32);
                        push_i24(buf, *lat as i32);
                        push_varint(buf, *node_idx);
                        push_varint(buf, *city_idx);
                    }
                }
            }
        }
    }

    fn write_louds_nodes(&self, buf: &mut Vec<u8>) {
        let mut bits: Vec<bool> = Vec::new();
        let mut edge_labels: Vec<&str> = Vec::new();
        for node in &self.nodes {
            for (label, _) in &node.edges {
                bits.push(true);
                edge_labels.push(label);
            }
            bits.push(false);
        }
        if self.omit_final_terminator {
            assert_eq!(bits.last(), Some(&false));
            bits.pop();
        }

        push_varint(buf, bits.len() as u32);
        let mut bitmap = vec![0u8; bits.len().div_ceil(8)];
        for (i, bit) in bits.iter().enumerate() {
            if *bit {
                bitmap[i / 8] |= 1 << (i & 7);
            }
        }
        buf.extend_from_slice(&bitmap);

        let written_labels = if self.drop_last_edge_label {
            &edge_labels[..edge_labels.len() - 1]
        } else {
            &edge_labels[..]
        };
        push_varint(buf, written_labels.len() as u32);
        for label in written_labels {
            push_str(buf, label);
        }

        let mut pending_nibble: Option<u8> = None;
        for node in &self.nodes {
            push_varint(buf, node.values.len() as u32);
            for value in &node.values {
                let RawValue::Inline {
                    lon,
                    lat,
                    node_idx,
                    city_idx,
                    kind,
                    pop,
                } = value
                else {
                    panic!("LOUDS versions store values inline");
                };
                push_i24(buf, *lon as i32);
                push_i24(buf, *lat as i32);
                push_varint(buf, *node_idx);
                push_varint(buf, *city_idx);
                match self.version {
                    10 => buf.push(*kind),
                    11 => match pending_nibble.take() {
                        Some(low) => buf.push(low | (kind << 4)),
                        None => pending_nibble = Some(*kind),
                    },
                    12 => buf.push((kind & 0x0F) | (pop << 4)),
                    _ => {}
                }
            }
        }
        if self.version == 11 {
            if let Some(low) = pending_nibble {
                buf.push(low);
            }
        }
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while !(a.is_char_boundary(len) && b.is_char_boundary(len)) {
        len -= 1;
    }
    len
}

fn push_varint(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            buf.push(byte | 0x80);
        } else {
            buf.push(byte);
            break;
        }
    }
}

fn push_i24(buf: &mut Vec<u8>, value: i32) {
    let raw = value as u32;
    buf.push(raw as u8);
    buf.push((raw >> 8) as u8);
    buf.push((raw >> 16) as u8);
}

fn push_u24(buf: &mut Vec<u8>, value: u32) {
    buf.push(value as u8);
    buf.push((value >> 8) as u8);
    buf.push((value >> 16) as u8);
}

fn push_str(buf: &mut Vec<u8>, s: &str) {
    push_varint(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

/// Gzip-compress bytes, for transport and manager tests.
pub(crate) fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Assemble an in-memory shard directly, bypassing the byte format. Used by
/// matcher and ranking tests that do not care about decoding.
pub(crate) fn make_shard(
    place_nodes: &[&str],
    place_cities: &[&str],
    nodes: Vec<TrieNode>,
) -> Shard {
    let location_count = nodes.iter().map(|n| n.values.len()).sum();
    Shard {
        version: 12,
        scale: 10_000_000.0,
        place_nodes: place_nodes.iter().map(|s| s.to_string()).collect(),
        place_cities: place_cities.iter().map(|s| s.to_string()).collect(),
        locations: vec![],
        nodes,
        location_count,
    }
}

/// Shorthand for an inline trie value.
pub(crate) fn inline_value(
    lon: f64,
    lat: f64,
    node_idx: u32,
    city_idx: u32,
    kind: PlaceKind,
    population_bucket: u8,
) -> TrieValue {
    TrieValue::Inline(Location {
        lon,
        lat,
        node_idx,
        city_idx,
        kind,
        population_bucket,
    })
}
