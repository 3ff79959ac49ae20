use crate::cli::GenerateArgs;
use crate::commands::progress_handler;
use crate::config::{CommandOverrides, build_config};
use crate::error::Result;
use latsweep::engine::progress::ProgressReporter;
use latsweep::workflows;
use tracing::info;

pub fn run(args: GenerateArgs, quiet: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args.config, &args.sweep, &CommandOverrides::default())?;

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let generated = workflows::generate::run(&config, &args.output_dir, &reporter)?;

    for input in &generated {
        println!("Created input file: {}", input.input_path.display());
        println!(
            "  Lattice parameter: {:.3} Å ({:.6} Bohr)",
            input.lattice_angstrom, input.lattice_bohr
        );
    }

    let dir = args.output_dir.display();
    println!(
        "\nGenerated {} input files in '{}/' directory",
        generated.len(),
        dir
    );
    println!("\nTo run calculations, use:");
    println!(
        "  {cmd} < {dir}/{stem}_aX.XXX.in > {dir}/{stem}_aX.XXX.out",
        cmd = config.execution.command.join(" "),
        stem = config.file_stem,
    );
    println!("\nOr run them all with: latsweep run -d {}", dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ConfigArgs, SweepOverrides};
    use std::fs;

    #[test]
    fn writes_one_input_per_point() {
        let temp = tempfile::tempdir().unwrap();
        let output_dir = temp.path().join("calculations");

        run(
            GenerateArgs {
                config: ConfigArgs::default(),
                sweep: SweepOverrides {
                    points: Some(3),
                    ..Default::default()
                },
                output_dir: output_dir.clone(),
            },
            true,
        )
        .unwrap();

        let mut names: Vec<String> = fs::read_dir(&output_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["cu_a2.200.in", "cu_a2.550.in", "cu_a2.900.in"]);
    }
}
