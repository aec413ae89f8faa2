use herald_provider::PushServiceRegistry;

use crate::OutputFormat;

pub fn run(registry: &PushServiceRegistry, format: &OutputFormat) -> anyhow::Result<()> {
    let names = registry.list();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        OutputFormat::Text => {
            println!("{} push services:", names.len());
            for name in names {
                println!("  {name}");
            }
        }
    }
    Ok(())
}
