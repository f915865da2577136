use anyhow::Result;
use tmm::derived::calculate_rat;
use tmm::settings::{self};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let settings = settings::load_config()?;
    let wavelengths = settings.wavelengths.values();
    let stack = settings.stack.to_stack(&wavelengths)?;

    let rat = calculate_rat(&stack, settings.angle, settings.polarization)?;

    println!("{:>12} {:>12} {:>12} {:>12}", "wavelength", "R", "A", "T");
    for (j, lam) in wavelengths.iter().enumerate() {
        println!(
            "{:>12.3} {:>12.6} {:>12.6} {:>12.6}",
            lam, rat.reflectance[j], rat.absorptance[j], rat.transmittance[j]
        );
    }

    println!();
    println!("absorbed per layer");
    for (i, row) in rat.absorbed_per_layer.as_array().rows().into_iter().enumerate() {
        let values: Vec<String> = row.iter().map(|a| format!("{a:.6}")).collect();
        println!("layer {:>3}: {}", i + 1, values.join(" "));
    }

    Ok(())
}
