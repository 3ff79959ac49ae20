//! Plot descriptions for LaTeX documents (pgfplots/TikZ).

pub mod tikz;
