//! Formatted terminal output.
//!
//! We keep formatting code in one place so the numerics stay clean and
//! output changes are localized.

use crate::domain::BasinResult;
use crate::report::{ColumnStats, CorpusSummary, SIGNIFICANCE_LEVEL};

/// One-line outcome for a basin.
pub fn format_basin_summary(result: &BasinResult) -> String {
    let s = &result.summary;
    let mut out = format!(
        "{} [{}] n={} rho={} tau={} chi_u={} chi_l={}",
        result.basin_id,
        result.status,
        result.n_observations,
        fmt_opt(s.spearman_rho, 3),
        fmt_opt(s.kendall_tau, 3),
        fmt_opt(s.chi_upper, 3),
        fmt_opt(s.chi_lower, 3),
    );
    if let Some(m) = result.n_months {
        out.push_str(&format!(" months={m}"));
    }
    match result.best_copula {
        Some(family) => out.push_str(&format!(
            " best={family} theta={} Sn={} p={}",
            fmt_opt(result.copula_parameter, 4),
            fmt_opt(result.copula_gof_statistic, 5),
            fmt_opt(result.copula_gof_pvalue, 3),
        )),
        None => out.push_str(" best=-"),
    }
    out
}

/// Multi-line corpus summary printed by `merge`.
pub fn format_corpus_summary(summary: &CorpusSummary) -> String {
    let total = summary.total_basins;
    let mut out = String::new();

    out.push_str("=== Summary statistics ===\n");
    out.push_str(&format!("Total basins analyzed: {total}\n"));

    out.push_str("\nSpearman correlation:\n");
    out.push_str(&format_stats(&summary.spearman_rho, true));

    out.push_str("\nKendall's tau:\n");
    out.push_str(&format_stats(&summary.kendall_tau, false));

    out.push_str("\nTail dependence:\n");
    out.push_str(&format!(
        "  Upper: mean={} std={}\n",
        fmt_stat(summary.chi_upper.mean),
        fmt_stat(summary.chi_upper.std)
    ));
    out.push_str(&format!(
        "  Lower: mean={} std={}\n",
        fmt_stat(summary.chi_lower.mean),
        fmt_stat(summary.chi_lower.std)
    ));

    out.push_str("\nBest copula distribution:\n");
    if summary.best_copula.is_empty() {
        out.push_str("  (none)\n");
    }
    for (family, &count) in &summary.best_copula {
        out.push_str(&format!("  {family:<10} {count} ({})\n", pct(count, total)));
    }

    out.push_str("\nStatus:\n");
    for (status, &count) in &summary.status {
        out.push_str(&format!("  {status:<12} {count}\n"));
    }

    out.push_str(&format!("\nSignificant correlations (p < {SIGNIFICANCE_LEVEL}):\n"));
    out.push_str(&format!(
        "  Spearman: {}/{total} ({})\n",
        summary.significant.spearman,
        pct(summary.significant.spearman, total)
    ));
    out.push_str(&format!(
        "  Kendall:  {}/{total} ({})\n",
        summary.significant.kendall,
        pct(summary.significant.kendall, total)
    ));

    out
}

fn format_stats(stats: &ColumnStats, with_range: bool) -> String {
    let mut out = format!(
        "  Mean: {}\n  Std:  {}\n",
        fmt_stat(stats.mean),
        fmt_stat(stats.std)
    );
    if with_range {
        out.push_str(&format!(
            "  Min:  {}\n  Max:  {}\n",
            fmt_stat(stats.min),
            fmt_stat(stats.max)
        ));
    }
    out
}

fn fmt_stat(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_opt(v: f64, digits: usize) -> String {
    if v.is_finite() {
        format!("{v:.digits$}")
    } else {
        "NaN".to_string()
    }
}

fn pct(count: usize, total: usize) -> String {
    if total == 0 {
        return "n/a".to_string();
    }
    format!("{:.1}%", count as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BasinStatus, CopulaFamily};
    use crate::report::summarize;

    #[test]
    fn basin_line_shows_fit_or_placeholder() {
        let mut r = BasinResult::undefined("01013500", 7, BasinStatus::Insufficient);
        let line = format_basin_summary(&r);
        assert!(line.starts_with("01013500 [insufficient] n=7"));
        assert!(line.ends_with("best=-"));

        r.status = BasinStatus::Ok;
        r.best_copula = Some(CopulaFamily::Clayton);
        r.copula_parameter = 2.0;
        let line = format_basin_summary(&r);
        assert!(line.contains("best=Clayton theta=2.0000"));
    }

    #[test]
    fn corpus_summary_lists_families_with_percentages() {
        let mut a = BasinResult::undefined("a", 50, BasinStatus::Ok);
        a.best_copula = Some(CopulaFamily::Gaussian);
        a.summary.spearman_rho = 0.5;
        a.summary.spearman_pvalue = 0.01;
        let b = BasinResult::undefined("b", 50, BasinStatus::Degenerate);
        let text = format_corpus_summary(&summarize(&[a, b]));
        assert!(text.contains("Total basins analyzed: 2"));
        assert!(text.contains("Gaussian   1 (50.0%)"));
        assert!(text.contains("Spearman: 1/2 (50.0%)"));
        assert!(text.contains("Std:  n/a"));
    }
}
