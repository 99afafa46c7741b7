//! List detectors command.

use anyhow::Result;
use quantlab_signals::DetectorRegistry;

pub async fn run() -> Result<()> {
    let registry = DetectorRegistry::new();

    println!("Signal Pipeline Detectors");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {}. {}", info.stage + 1, info.name);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Defaults: {}", info.default_config);
        println!();
    }

    println!("Stages run in the order above; settings live under [signals] in the config file.");

    Ok(())
}
