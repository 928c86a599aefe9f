fn main() -> anyhow::Result<()> {
    lab_app::platform::run_app()
}
