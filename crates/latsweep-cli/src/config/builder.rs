use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileStructureConfig};
use crate::cli::{ConfigArgs, SweepOverrides};
use crate::error::{CliError, Result};
use crate::utils::parser;
use latsweep::core::elements;
use latsweep::core::io::pwscf_input::{KPointGrid, PwParameters, Species};
use latsweep::core::lattice::LatticeSweep;
use latsweep::engine::config::{SweepConfig, SweepConfigBuilder};
use std::str::FromStr;
use tracing::debug;

/// Flags that only some subcommands expose.
#[derive(Debug, Default, Clone)]
pub struct CommandOverrides {
    pub command: Option<Vec<String>>,
    pub max_concurrent: Option<usize>,
    pub rerun: bool,
    pub polynomial_degree: Option<usize>,
}

/// Merges defaults, the TOML file, `--set` values and dedicated flags, in that
/// order of precedence, into a validated core configuration.
pub fn build_config(
    config_args: &ConfigArgs,
    sweep_args: &SweepOverrides,
    overrides: &CommandOverrides,
) -> Result<SweepConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &config_args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &config_args.set_values)?;

    let sweep_file = file_config.sweep.take().unwrap_or_default();
    let sweep = LatticeSweep::new(
        sweep_args
            .start
            .or(sweep_file.start)
            .unwrap_or(defaults.sweep_start),
        sweep_args.end.or(sweep_file.end).unwrap_or(defaults.sweep_end),
        sweep_args
            .points
            .or(sweep_file.num_points)
            .unwrap_or(defaults.sweep_points),
    );

    let pw = merge_pw_parameters(&mut file_config, sweep_args, &defaults.pw)?;

    let analysis_file = file_config.analysis.take().unwrap_or_default();
    let execution_file = file_config.execution.take().unwrap_or_default();

    let command = overrides
        .command
        .clone()
        .or(execution_file.command)
        .unwrap_or_else(|| defaults.execution.command.clone());
    let skip_completed = if overrides.rerun {
        false
    } else {
        execution_file
            .skip_completed
            .unwrap_or(defaults.execution.skip_completed)
    };

    let mut builder = SweepConfigBuilder::new()
        .sweep(sweep)
        .pw_parameters(pw)
        .polynomial_degree(
            overrides
                .polynomial_degree
                .or(analysis_file.polynomial_degree)
                .unwrap_or(defaults.analysis.polynomial_degree),
        )
        .grid_points(
            analysis_file
                .grid_points
                .unwrap_or(defaults.analysis.grid_points),
        )
        .curve_samples(
            analysis_file
                .curve_samples
                .unwrap_or(defaults.analysis.curve_samples),
        )
        .plot_margin(
            analysis_file
                .plot_margin
                .unwrap_or(defaults.analysis.plot_margin),
        )
        .command(command)
        .max_concurrent(
            overrides
                .max_concurrent
                .or(execution_file.max_concurrent)
                .unwrap_or(defaults.execution.max_concurrent),
        )
        .skip_completed(skip_completed);
    if let Some(stem) = file_config.file_stem.take() {
        builder = builder.file_stem(stem);
    }

    let config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!("Resolved sweep configuration: {:?}", config);
    Ok(config)
}

fn merge_pw_parameters(
    file_config: &mut FileConfig,
    sweep_args: &SweepOverrides,
    defaults: &PwParameters,
) -> Result<PwParameters> {
    let structure = file_config.structure.take().unwrap_or_default();
    let calc = file_config.calculation.take().unwrap_or_default();

    let lattice = match sweep_args.lattice.as_deref().or(structure.lattice.as_deref()) {
        Some(name) => parser::parse_lattice(name).map_err(|e| CliError::Argument(e.to_string()))?,
        None => defaults.lattice,
    };

    let kpoint_mesh = match &sweep_args.kpoints {
        Some(text) => {
            parser::parse_kpoint_mesh(text).map_err(|e| CliError::Argument(e.to_string()))?
        }
        None => calc.kpoints.unwrap_or(defaults.kpoints.mesh),
    };

    let species = merge_species(
        sweep_args.element.as_deref(),
        structure,
        &defaults.species,
    )?;

    Ok(PwParameters {
        lattice,
        species,
        outdir: calc.outdir.unwrap_or_else(|| defaults.outdir.clone()),
        pseudo_dir: calc.pseudo_dir.unwrap_or_else(|| defaults.pseudo_dir.clone()),
        verbosity: calc.verbosity.unwrap_or_else(|| defaults.verbosity.clone()),
        ecutwfc: calc.ecutwfc.unwrap_or(defaults.ecutwfc),
        occupations: calc
            .occupations
            .unwrap_or_else(|| defaults.occupations.clone()),
        smearing: calc.smearing.unwrap_or_else(|| defaults.smearing.clone()),
        degauss: calc.degauss.unwrap_or(defaults.degauss),
        input_dft: calc.input_dft.unwrap_or_else(|| defaults.input_dft.clone()),
        conv_thr: calc.conv_thr.unwrap_or(defaults.conv_thr),
        mixing_beta: calc.mixing_beta.unwrap_or(defaults.mixing_beta),
        kpoints: KPointGrid {
            mesh: kpoint_mesh,
            shift: calc.kpoint_shift.unwrap_or(defaults.kpoints.shift),
        },
    })
}

/// The default mass and pseudopotential belong to the default element; any other
/// element takes its mass from the periodic table and needs its own pseudopotential.
fn merge_species(
    cli_element: Option<&str>,
    structure: FileStructureConfig,
    defaults: &Species,
) -> Result<Species> {
    let symbol = cli_element
        .map(str::to_string)
        .or(structure.element)
        .unwrap_or_else(|| defaults.symbol.clone());
    let is_default_element = symbol == defaults.symbol;

    let mass = match structure.mass {
        Some(mass) => mass,
        None if is_default_element => defaults.mass,
        None => elements::atomic_mass(&symbol).ok_or_else(|| {
            CliError::Config(format!(
                "No tabulated atomic mass for element '{}'; set structure.mass.",
                symbol
            ))
        })?,
    };

    let pseudopotential = match structure.pseudopotential {
        Some(pseudo) => pseudo,
        None if is_default_element => defaults.pseudopotential.clone(),
        None => {
            return Err(CliError::Config(format!(
                "Element '{}' needs a pseudopotential; set structure.pseudopotential.",
                symbol
            )));
        }
    };

    Ok(Species {
        symbol,
        mass,
        pseudopotential,
    })
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        }
        let key = parts[0].trim();
        let value_str = parts[1].trim();

        match key {
            "file-stem" => config.file_stem = Some(value_str.to_string()),
            "sweep.start" => {
                config.sweep.get_or_insert_with(Default::default).start =
                    Some(parse_value(key, value_str, "float")?);
            }
            "sweep.end" => {
                config.sweep.get_or_insert_with(Default::default).end =
                    Some(parse_value(key, value_str, "float")?);
            }
            "sweep.num-points" => {
                config.sweep.get_or_insert_with(Default::default).num_points =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "structure.lattice" => {
                config.structure.get_or_insert_with(Default::default).lattice =
                    Some(value_str.to_string());
            }
            "structure.element" => {
                config.structure.get_or_insert_with(Default::default).element =
                    Some(value_str.to_string());
            }
            "structure.mass" => {
                config.structure.get_or_insert_with(Default::default).mass =
                    Some(parse_value(key, value_str, "float")?);
            }
            "structure.pseudopotential" => {
                config
                    .structure
                    .get_or_insert_with(Default::default)
                    .pseudopotential = Some(value_str.to_string());
            }
            "calculation.outdir" => {
                config.calculation.get_or_insert_with(Default::default).outdir =
                    Some(value_str.to_string());
            }
            "calculation.pseudo-dir" => {
                config
                    .calculation
                    .get_or_insert_with(Default::default)
                    .pseudo_dir = Some(value_str.to_string());
            }
            "calculation.verbosity" => {
                config
                    .calculation
                    .get_or_insert_with(Default::default)
                    .verbosity = Some(value_str.to_string());
            }
            "calculation.ecutwfc" => {
                config.calculation.get_or_insert_with(Default::default).ecutwfc =
                    Some(parse_value(key, value_str, "float")?);
            }
            "calculation.occupations" => {
                config
                    .calculation
                    .get_or_insert_with(Default::default)
                    .occupations = Some(value_str.to_string());
            }
            "calculation.smearing" => {
                config.calculation.get_or_insert_with(Default::default).smearing =
                    Some(value_str.to_string());
            }
            "calculation.degauss" => {
                config.calculation.get_or_insert_with(Default::default).degauss =
                    Some(parse_value(key, value_str, "float")?);
            }
            "calculation.input-dft" => {
                config
                    .calculation
                    .get_or_insert_with(Default::default)
                    .input_dft = Some(value_str.to_string());
            }
            "calculation.conv-thr" => {
                config.calculation.get_or_insert_with(Default::default).conv_thr =
                    Some(parse_value(key, value_str, "float")?);
            }
            "calculation.mixing-beta" => {
                config
                    .calculation
                    .get_or_insert_with(Default::default)
                    .mixing_beta = Some(parse_value(key, value_str, "float")?);
            }
            "calculation.kpoints" => {
                config.calculation.get_or_insert_with(Default::default).kpoints = Some(
                    parser::parse_kpoint_mesh(value_str)
                        .map_err(|e| CliError::Config(e.to_string()))?,
                );
            }
            "calculation.kpoint-shift" => {
                config
                    .calculation
                    .get_or_insert_with(Default::default)
                    .kpoint_shift = Some(
                    parser::parse_kpoint_shift(value_str)
                        .map_err(|e| CliError::Config(e.to_string()))?,
                );
            }
            "analysis.polynomial-degree" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .polynomial_degree = Some(parse_value(key, value_str, "integer")?);
            }
            "analysis.grid-points" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .grid_points = Some(parse_value(key, value_str, "integer")?);
            }
            "analysis.curve-samples" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .curve_samples = Some(parse_value(key, value_str, "integer")?);
            }
            "analysis.plot-margin" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .plot_margin = Some(parse_value(key, value_str, "float")?);
            }
            "execution.command" => {
                config.execution.get_or_insert_with(Default::default).command = Some(
                    parser::parse_command(value_str, "execution.command")
                        .map_err(|e| CliError::Config(e.to_string()))?,
                );
            }
            "execution.max-concurrent" => {
                config
                    .execution
                    .get_or_insert_with(Default::default)
                    .max_concurrent = Some(parse_value(key, value_str, "integer")?);
            }
            "execution.skip-completed" => {
                config
                    .execution
                    .get_or_insert_with(Default::default)
                    .skip_completed = Some(parse_value(key, value_str, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
