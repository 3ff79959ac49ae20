use crate::core::fit::polynomial::linspace;
use std::fmt::Write;

/// Everything needed to draw an energy-versus-lattice-parameter figure.
#[derive(Debug, Clone)]
pub struct EnergyPlot<'a> {
    pub title: String,
    /// Calculated `(a, E)` points, sorted by lattice parameter.
    pub points: &'a [(f64, f64)],
    /// The fitted curve on the dense evaluation grid.
    pub curve: &'a [(f64, f64)],
    /// How many curve points to emit; the dense grid is subsampled evenly.
    pub curve_samples: usize,
    pub fit_degree: usize,
    pub equilibrium: f64,
    /// Fraction of the energy range the equilibrium marker extends past the data.
    pub margin: f64,
}

const AXIS_HEADER: &str = r"\begin{tikzpicture}
\begin{axis}[
    width=12cm,
    height=8cm,
    xlabel={Lattice Parameter (\AA)},
    ylabel={Total Energy (eV/atom)},
";

const AXIS_STYLE: &str = r"    grid=major,
    grid style={dashed, gray!30},
    legend pos=north east,
    legend style={font=\small},
    tick label style={font=\small},
    label style={font=\footnotesize},
    title style={font=\bfseries}
]

% Calculated points
\addplot[
    only marks,
    mark=*,
    mark size=2.5pt,
    color=blue,
] coordinates {
";

const FIT_HEADER: &str = r"};
\addlegendentry{Calculated points}

% Polynomial fit
\addplot[
    color=red,
    line width=1.2pt,
    smooth,
] coordinates {
";

const MARKER_HEADER: &str = r"% Vertical line at minimum
\addplot[
    color=green!70!black,
    dashed,
    line width=1pt,
] coordinates {
";

const FOOTER: &str = r"
\end{axis}
\end{tikzpicture}";

/// English ordinal for a polynomial degree: `1st`, `2nd`, `3rd`, `4th`, `11th`, `22nd`.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Indices of `samples` evenly spaced entries of a sequence of length `len`, truncated
/// towards zero.
pub fn subsample_indices(len: usize, samples: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    linspace(0.0, (len - 1) as f64, samples)
        .into_iter()
        .map(|x| x as usize)
        .collect()
}

/// Renders a pgfplots `tikzpicture` with the calculated points, the fitted curve and a
/// dashed vertical marker at the equilibrium lattice parameter.
pub fn render(plot: &EnergyPlot) -> String {
    let mut out = String::new();
    out.push_str(AXIS_HEADER);
    let _ = writeln!(out, "    title={{{}}},", plot.title);
    out.push_str(AXIS_STYLE);

    for (a, e) in plot.points {
        push_coordinate(&mut out, *a, *e);
    }

    out.push_str(FIT_HEADER);
    for index in subsample_indices(plot.curve.len(), plot.curve_samples) {
        let (a, e) = plot.curve[index];
        push_coordinate(&mut out, a, e);
    }
    out.push_str("};\n");
    let _ = writeln!(
        out,
        "\\addlegendentry{{{} order polynomial fit}}",
        ordinal(plot.fit_degree)
    );
    out.push('\n');

    out.push_str(MARKER_HEADER);
    let (y_bottom, y_top) = marker_extent(plot.points, plot.margin);
    push_coordinate(&mut out, plot.equilibrium, y_bottom);
    push_coordinate(&mut out, plot.equilibrium, y_top);
    out.push_str("};\n");
    let _ = writeln!(
        out,
        "\\addlegendentry{{Minimum at $a={:.4}$ \\AA}}",
        plot.equilibrium
    );

    out.push_str(FOOTER);
    out
}

fn push_coordinate(out: &mut String, a: f64, e: f64) {
    let _ = writeln!(out, "    ({:.6}, {:.6})", a, e);
}

fn marker_extent(points: &[(f64, f64)], margin: f64) -> (f64, f64) {
    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, e)| {
            (lo.min(e), hi.max(e))
        });
    if !y_min.is_finite() {
        return (0.0, 0.0);
    }
    let range = y_max - y_min;
    (y_min - margin * range, y_max + margin * range)
}
