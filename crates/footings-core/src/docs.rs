//! Renderizado de documentación de un modelo (secciones por rol + steps).

use std::fmt::Write;

use crate::attribute::Role;
use crate::model::ModelSchema;

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

impl<M> ModelSchema<M> {
    /// Texto estilo numpydoc: resumen, una sección por rol con atributos y
    /// una sección `Steps` con `"{idx}. {name} - {doc}"`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.name);
        if let Some(doc) = &self.doc {
            let _ = writeln!(out, "\n{doc}");
        }

        for role in Role::ALL {
            let names = self.names_of(role);
            if names.is_empty() {
                continue;
            }
            out.push('\n');
            heading(&mut out, role.section());
            for name in names {
                let Some(attr) = self.attribute(name) else { continue };
                match attr.argument.dtype {
                    Some(kind) => {
                        let _ = writeln!(out, "{name} : {kind}");
                    }
                    None => {
                        let _ = writeln!(out, "{name}");
                    }
                }
                if let Some(desc) = &attr.argument.description {
                    let _ = writeln!(out, "    {desc}");
                }
            }
        }

        out.push('\n');
        heading(&mut out, "Steps");
        for (idx, step) in self.steps().iter().enumerate() {
            let _ = writeln!(out, "{}. {} - {}", idx + 1, step.name(), step.docstring().unwrap_or(""));
        }
        out
    }
}
