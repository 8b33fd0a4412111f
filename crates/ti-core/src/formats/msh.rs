//! Minimal Gmsh `.msh` (format 2.2, ASCII) reader/writer with named
//! per-node and per-element field sections (spec §6.3).
//!
//! Only what the simulator and analyzer need is implemented: tetrahedral
//! volume elements (Gmsh element type 4) and one scalar
//! `$NodeData`/`$ElementData` section per named field. Anything else in
//! the format (surface elements, vector/tensor field blocks, physical
//! group names) is out of scope — the core never reads those sections.

use crate::error::{Result, TiError};
use crate::geometry::Point3;
use crate::mesh::TetMesh;

fn malformed(reason: impl Into<String>) -> TiError {
    TiError::MalformedFile { format: "msh".into(), reason: reason.into() }
}

/// A named scalar field to attach to a `.msh` file, either per-node or
/// per-element.
pub struct NamedField<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
    pub per_node: bool,
}

/// Writes `mesh` plus any number of named scalar fields to Gmsh ASCII 2.2.
pub fn write_msh(mesh: &TetMesh, fields: &[NamedField]) -> String {
    let mut out = String::new();
    out.push_str("$MeshFormat\n2.2 0 8\n$EndMeshFormat\n");

    out.push_str("$Nodes\n");
    out.push_str(&format!("{}\n", mesh.node_count()));
    for (i, node) in mesh.nodes.iter().enumerate() {
        out.push_str(&format!("{} {} {} {}\n", i + 1, node.x, node.y, node.z));
    }
    out.push_str("$EndNodes\n");

    out.push_str("$Elements\n");
    out.push_str(&format!("{}\n", mesh.element_count()));
    for (i, elem) in mesh.elements.iter().enumerate() {
        let tag = mesh.tissue_tags.get(i).copied().unwrap_or(0);
        out.push_str(&format!(
            "{} 4 2 {} {} {} {} {} {}\n",
            i + 1,
            tag,
            tag,
            elem[0] + 1,
            elem[1] + 1,
            elem[2] + 1,
            elem[3] + 1,
        ));
    }
    out.push_str("$EndElements\n");

    for field in fields {
        let section = if field.per_node { "NodeData" } else { "ElementData" };
        out.push_str(&format!("${section}\n"));
        out.push_str("1\n");
        out.push_str(&format!("\"{}\"\n", field.name));
        out.push_str("1\n0.0\n3\n0\n1\n");
        out.push_str(&format!("{}\n", field.values.len()));
        for (i, v) in field.values.iter().enumerate() {
            out.push_str(&format!("{} {}\n", i + 1, v));
        }
        out.push_str(&format!("$End{section}\n"));
    }

    out
}

/// Parses a Gmsh ASCII 2.2 file back into a mesh and any named fields it
/// carries, in file order.
pub fn read_msh(contents: &str) -> Result<(TetMesh, Vec<(String, bool, Vec<f64>)>)> {
    let mut lines = contents.lines().peekable();
    let mut nodes = Vec::new();
    let mut elements = Vec::new();
    let mut tissue_tags = Vec::new();
    let mut fields = Vec::new();

    while let Some(line) = lines.next() {
        match line.trim() {
            "$Nodes" => {
                let count: usize = lines
                    .next()
                    .ok_or_else(|| malformed("missing node count"))?
                    .trim()
                    .parse()
                    .map_err(|_| malformed("bad node count"))?;
                nodes = Vec::with_capacity(count);
                for _ in 0..count {
                    let l = lines.next().ok_or_else(|| malformed("truncated node block"))?;
                    let parts: Vec<&str> = l.split_whitespace().collect();
                    if parts.len() < 4 {
                        return Err(malformed("node line has fewer than 4 fields"));
                    }
                    let x: f64 = parts[1].parse().map_err(|_| malformed("bad x coordinate"))?;
                    let y: f64 = parts[2].parse().map_err(|_| malformed("bad y coordinate"))?;
                    let z: f64 = parts[3].parse().map_err(|_| malformed("bad z coordinate"))?;
                    nodes.push(Point3::new(x, y, z));
                }
            }
            "$Elements" => {
                let count: usize = lines
                    .next()
                    .ok_or_else(|| malformed("missing element count"))?
                    .trim()
                    .parse()
                    .map_err(|_| malformed("bad element count"))?;
                elements = Vec::with_capacity(count);
                tissue_tags = Vec::with_capacity(count);
                for _ in 0..count {
                    let l = lines.next().ok_or_else(|| malformed("truncated element block"))?;
                    let parts: Vec<&str> = l.split_whitespace().collect();
                    if parts.len() < 9 {
                        return Err(malformed("element line has fewer than 9 fields"));
                    }
                    let tag: u16 = parts[3].parse().map_err(|_| malformed("bad tissue tag"))?;
                    let n = |idx: usize| -> Result<u32> {
                        let v: u32 = parts[idx].parse().map_err(|_| malformed("bad node index"))?;
                        Ok(v - 1)
                    };
                    elements.push([n(5)?, n(6)?, n(7)?, n(8)?]);
                    tissue_tags.push(tag);
                }
            }
            "$NodeData" | "$ElementData" => {
                let per_node = line.trim() == "$NodeData";
                let end_tag = if per_node { "$EndNodeData" } else { "$EndElementData" };
                let num_string_tags: usize = lines
                    .next()
                    .ok_or_else(|| malformed("missing string-tag count"))?
                    .trim()
                    .parse()
                    .map_err(|_| malformed("bad string-tag count"))?;
                let mut name = String::new();
                for i in 0..num_string_tags {
                    let tag_line = lines.next().ok_or_else(|| malformed("truncated string tags"))?;
                    if i == 0 {
                        name = tag_line.trim().trim_matches('"').to_string();
                    }
                }
                let num_real_tags: usize = lines
                    .next()
                    .ok_or_else(|| malformed("missing real-tag count"))?
                    .trim()
                    .parse()
                    .map_err(|_| malformed("bad real-tag count"))?;
                for _ in 0..num_real_tags {
                    lines.next();
                }
                let num_int_tags: usize = lines
                    .next()
                    .ok_or_else(|| malformed("missing int-tag count"))?
                    .trim()
                    .parse()
                    .map_err(|_| malformed("bad int-tag count"))?;
                let mut count = 0usize;
                for i in 0..num_int_tags {
                    let v: usize = lines
                        .next()
                        .ok_or_else(|| malformed("truncated int tags"))?
                        .trim()
                        .parse()
                        .map_err(|_| malformed("bad int tag"))?;
                    if i == num_int_tags - 1 {
                        count = v;
                    }
                }
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    let l = lines.next().ok_or_else(|| malformed("truncated data block"))?;
                    let parts: Vec<&str> = l.split_whitespace().collect();
                    let v: f64 = parts
                        .get(1)
                        .ok_or_else(|| malformed("missing data value"))?
                        .parse()
                        .map_err(|_| malformed("bad data value"))?;
                    values.push(v);
                }
                let end_line = lines.next().ok_or_else(|| malformed("missing end tag"))?;
                if end_line.trim() != end_tag {
                    return Err(malformed(format!("expected {end_tag}")));
                }
                fields.push((name, per_node, values));
            }
            _ => {}
        }
    }

    Ok((TetMesh { nodes, elements, tissue_tags }, fields))
}
