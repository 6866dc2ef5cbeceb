fn main() -> anyhow::Result<()> {
    if let Err(e) = bagrut_portal_rust::run() {
        eprintln!("bagrut-portal fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
