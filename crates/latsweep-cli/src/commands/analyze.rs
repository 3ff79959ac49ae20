use crate::cli::AnalyzeArgs;
use crate::commands::progress_handler;
use crate::config::{CommandOverrides, build_config};
use crate::error::Result;
use latsweep::core::io::results;
use latsweep::engine::error::EngineError;
use latsweep::engine::progress::ProgressReporter;
use latsweep::workflows;
use std::fs;
use tracing::info;

const RULE_WIDTH: usize = 50;

pub fn run(args: AnalyzeArgs, quiet: bool) -> Result<()> {
    let overrides = CommandOverrides {
        polynomial_degree: args.degree,
        ..Default::default()
    };
    let config = build_config(&args.config, &args.sweep, &overrides)?;

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = workflows::analyze::run(&config, &args.dir, &reporter)?;

    for point in &report.points {
        println!(
            "a = {:.3} Å: E = {:.6} eV",
            point.lattice_angstrom, point.energy_ev
        );
    }
    if !report.skipped.is_empty() {
        println!(
            "({} output(s) without a final energy left out of the fit)",
            report.skipped.len()
        );
    }

    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}", rule);
    println!(
        "Equilibrium lattice parameter: {:.4} Å",
        report.equilibrium.lattice_angstrom
    );
    println!("Minimum energy: {:.6} eV/atom", report.equilibrium.energy_ev);
    println!("{}", rule);

    if let (Some(bm), Some(a_bm)) = (
        report.birch_murnaghan,
        report.birch_murnaghan_lattice(&config),
    ) {
        println!("\nBirch–Murnaghan fit:");
        println!("  Equilibrium lattice parameter: {:.4} Å", a_bm);
        println!("  Equilibrium volume: {:.4} Å³/atom", bm.v0);
        println!("  Minimum energy: {:.6} eV/atom", bm.e0);
        println!("  Bulk modulus: {:.2} GPa", bm.bulk_modulus_gpa());
        println!("  Pressure derivative B0': {:.3}", bm.b0_prime);
    }

    if let Some(parent) = args.plot.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.plot, report.render_tikz(&config))?;
    info!("TikZ plot written to {:?}", &args.plot);

    if let Some(csv_path) = &args.csv {
        results::write_points_to_path(&report.points, csv_path).map_err(EngineError::from)?;
        println!("\nEnergies saved as '{}'", csv_path.display());
    }

    let plot = args.plot.display();
    println!("\nTikZ plot saved as '{}'", plot);
    println!("\nTo use this in LaTeX, include the following in your preamble:");
    println!("  \\usepackage{{pgfplots}}");
    println!("  \\pgfplotsset{{compat=1.18}}");
    println!("\nThen include the file with: \\input{{{}}}", plot);
    Ok(())
}
