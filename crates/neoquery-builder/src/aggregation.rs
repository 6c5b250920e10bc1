//! Aggregate-function accumulator.
//!
//! Aggregations are not query fragments: they are collected here and
//! pulled into the RETURN projection when the query is rendered.

/// Supported aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    StDev,
    StDevP,
    Max,
    Min,
    Collect,
    PercentileDisc,
    PercentileCont,
}

impl Aggregate {
    pub fn function_name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::StDev => "stdev",
            Self::StDevP => "stdevp",
            Self::Max => "max",
            Self::Min => "min",
            Self::Collect => "collect",
            Self::PercentileDisc => "percentileDisc",
            Self::PercentileCont => "percentileCont",
        }
    }

    /// Percentile functions take the percentile as a second argument.
    fn takes_value(self) -> bool {
        matches!(self, Self::PercentileDisc | Self::PercentileCont)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    items: Vec<String>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `func(DISTINCT expression, value)`.
    ///
    /// `value` is only used by the percentile functions. An empty
    /// expression is ignored.
    pub fn aggregate(
        &mut self,
        func: Aggregate,
        expression: &str,
        distinct: bool,
        value: Option<&str>,
    ) -> &mut Self {
        if expression.trim().is_empty() {
            return self;
        }
        let mut args = String::new();
        if distinct {
            args.push_str("DISTINCT ");
        }
        args.push_str(expression);
        if func.takes_value()
            && let Some(value) = value
            && !value.is_empty()
        {
            args.push_str(", ");
            args.push_str(value);
        }
        self.items.push(format!("{}({args})", func.function_name()));
        self
    }

    /// Comma-joined rendering, empty when nothing was aggregated.
    pub fn render(&self) -> String {
        self.items.join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn reset(&mut self) -> &mut Self {
        self.items.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_joined_functions() {
        let mut agg = Aggregation::new();
        agg.aggregate(Aggregate::Count, "n", false, None)
            .aggregate(Aggregate::Collect, "n.name", true, None);
        assert_eq!(agg.render(), "count(n), collect(DISTINCT n.name)");
    }

    #[test]
    fn percentile_takes_second_argument() {
        let mut agg = Aggregation::new();
        agg.aggregate(Aggregate::PercentileDisc, "n.age", false, Some("0.5"));
        assert_eq!(agg.render(), "percentileDisc(n.age, 0.5)");
    }

    #[test]
    fn value_ignored_for_plain_functions() {
        let mut agg = Aggregation::new();
        agg.aggregate(Aggregate::Sum, "n.score", false, Some("7"));
        assert_eq!(agg.render(), "sum(n.score)");
    }

    #[test]
    fn empty_expression_is_ignored() {
        let mut agg = Aggregation::new();
        agg.aggregate(Aggregate::Count, "", false, None)
            .aggregate(Aggregate::Avg, "  ", true, None);
        assert!(agg.is_empty());
        assert_eq!(agg.render(), "");
    }

    #[test]
    fn reset_clears_everything() {
        let mut agg = Aggregation::new();
        agg.aggregate(Aggregate::Max, "n.age", false, None);
        assert!(!agg.is_empty());
        agg.reset();
        assert!(agg.is_empty());
        assert_eq!(agg.render(), "");
    }
}
