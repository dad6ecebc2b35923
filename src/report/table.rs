use std::io;
use termcolor::{Color, ColorSpec, WriteColor};

use super::FlowRow;

/// Print each flow as a `Flow ID` header followed by `name: value` lines
pub fn render<R: FlowRow, W: WriteColor>(rows: &[R], out: &mut W) -> io::Result<()> {
    let mut header = ColorSpec::new();
    header.set_fg(Some(Color::Cyan)).set_bold(true);

    for row in rows {
        writeln!(out)?;
        out.set_color(&header)?;
        write!(out, "{:<19}: {}", "Flow ID", row.flow_id())?;
        out.reset()?;
        writeln!(out)?;

        for (name, value) in row.fields() {
            writeln!(out, "{:<19}: {}", name, value)?;
        }
    }

    out.flush()
}
