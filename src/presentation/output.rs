// Standard output rendering of the generated dashboard
use crate::domain::dashboard::Dashboard;
use std::io::Write;

const HEADER: &str = "Dashboard Body";

pub fn write_body<W: Write>(out: &mut W, dashboard: &Dashboard) -> anyhow::Result<()> {
    writeln!(out, "{}", HEADER)?;
    writeln!(out, "{}", dashboard.pretty_body()?)?;
    Ok(())
}

pub fn print_body(dashboard: &Dashboard) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_body(&mut handle, dashboard)?;
    handle.flush()?;
    Ok(())
}
