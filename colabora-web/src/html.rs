//! HTML rendering of search results.

use std::fmt::{self, Display, Write};

use colabora_store::Initiative;

/// The column headings of the results table.
const HEADINGS: [&str; 6] = [
    "Entidad",
    "Legislatura",
    "Número",
    "Tema",
    "Cambios",
    "Documento",
];

/// Render `initiatives` as a complete HTML page with one table row each.
pub fn render_listing(initiatives: &[Initiative]) -> String {
    Listing(initiatives).to_string()
}

/// A results page.
struct Listing<'a>(&'a [Initiative]);

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n")?;
        f.write_str("<meta charset=\"utf-8\">\n<title>Iniciativas</title>\n</head>\n<body>\n")?;
        f.write_str("<table>\n<thead>\n<tr>")?;
        for heading in HEADINGS {
            write!(f, "<th>{}</th>", heading)?;
        }
        f.write_str("</tr>\n</thead>\n<tbody>\n")?;
        for initiative in self.0 {
            writeln!(
                f,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                Escaped(&initiative.entidad),
                Escaped(&initiative.legislatura),
                initiative.numero,
                Escaped(&initiative.tema),
                Escaped(&initiative.cambios),
                Escaped(&initiative.documento),
            )?;
        }
        f.write_str("</tbody>\n</table>\n</body>\n</html>\n")
    }
}

/// Text made safe to place inside an HTML element or attribute.
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#x27;")?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}
