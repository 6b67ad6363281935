fn main() -> anyhow::Result<()> {
    irbeam_lib::run()
}
