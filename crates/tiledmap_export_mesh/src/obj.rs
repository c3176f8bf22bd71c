//! Wavefront OBJ text output.
//!
//! Layout: header comments, `v` lines, `vt` lines, the single shared `vn` line, then
//! one `g` block per group with `f v/vt/vn` lines. Sections are separated by a blank
//! line. Floats use Rust's shortest round-trip formatting, so the text is a pure
//! function of the assembled mesh.

use std::fmt::{self, Write};

use crate::assembler::{FACE_NORMAL, MeshAssembly};

impl MeshAssembly {
    /// Write the mesh as OBJ text. `header` becomes the first comment line.
    pub fn write_obj<W: Write>(&self, out: &mut W, header: &str) -> fmt::Result {
        for line in header.lines() {
            writeln!(out, "# {line}")?;
        }
        writeln!(
            out,
            "# {} vertices, {} texture coordinates, {} faces in {} groups",
            self.vertices.len(),
            self.tex_coords.len(),
            self.face_count(),
            self.groups.len()
        )?;

        for v in &self.vertices {
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(out)?;

        for t in &self.tex_coords {
            writeln!(out, "vt {} {}", t.x, t.y)?;
        }
        writeln!(out)?;

        writeln!(out, "vn {} {} {}", FACE_NORMAL.x, FACE_NORMAL.y, FACE_NORMAL.z)?;

        for group in &self.groups {
            writeln!(out)?;
            writeln!(out, "g {}", group.name)?;
            for face in &group.faces {
                out.write_char('f')?;
                for (v, t) in face.vertices.iter().zip(face.tex_coords.iter()) {
                    write!(out, " {v}/{t}/1")?;
                }
                out.write_char('\n')?;
            }
        }
        Ok(())
    }

    /// The mesh as an OBJ string.
    pub fn to_obj(&self, header: &str) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_obj(&mut text, header);
        text
    }
}
