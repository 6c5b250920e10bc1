//! Fluent query builder.
//!
//! A `QueryBuilder` is a single-owner scratchpad: it records clause
//! fragments in call order, tracks which placeholders to return, and
//! renders the final query text plus the bound parameter map. Reset it (or
//! let the execution pipeline reset it) between logically distinct queries.

use crate::aggregation::{Aggregate, Aggregation};
use crate::error::{BuilderError, BuilderErrorKind};
use crate::format::{prepare_parameter, render_value};
use crate::functions::{self, Predicate, SizeOf};
use crate::types::{LabelMap, Parameters, Properties, PropertyValue};

/// Relationship placeholder used by [`QueryBuilder::relate`] when none is given.
pub const DEFAULT_RELATE_PLACEHOLDER: &str = "ar";
/// Relationship placeholder used by [`QueryBuilder::merge_relationship`] when none is given.
pub const DEFAULT_MERGE_RELATIONSHIP_PLACEHOLDER: &str = "r";

/// Empty parameter list for calls that bind nothing.
pub const NO_PARAMS: [(&str, serde_json::Value); 0] = [];

/// Sort direction of the ORDER BY clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Schema index operation for [`QueryBuilder::index_on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAction {
    Create,
    Drop,
}

impl IndexAction {
    fn keyword(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Drop => "DROP",
        }
    }
}

/// Kind of the CASE expression currently open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseKind {
    #[default]
    None,
    /// `CASE field WHEN value ...`
    Simple,
    /// `CASE WHEN field = value ...`
    Generic,
}

#[derive(Debug, Clone, Copy, Default)]
struct CaseState {
    kind: CaseKind,
    when_seen: bool,
    then_seen: bool,
}

#[derive(Debug, Clone, Copy)]
enum NodeClause {
    Match,
    OptionalMatch,
    Create,
    Merge,
}

impl NodeClause {
    fn keyword(self) -> &'static str {
        match self {
            Self::Match => "MATCH",
            Self::OptionalMatch => "OPTIONAL MATCH",
            Self::Create => "CREATE",
            Self::Merge => "MERGE",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    start: String,
    fragments: Vec<String>,
    where_text: String,
    placeholders: Vec<String>,
    explicit_return: Option<Vec<String>>,
    distinct: bool,
    order_by: Vec<String>,
    order_direction: OrderDirection,
    skip: Option<u64>,
    limit: Option<u64>,
    case: CaseState,
    errors: Vec<BuilderError>,
    parameters: Parameters,
    aggregation: Aggregation,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every piece of state, bound parameters included.
    pub fn reset(&mut self) -> &mut Self {
        self.start.clear();
        self.fragments.clear();
        self.where_text.clear();
        self.placeholders.clear();
        self.explicit_return = None;
        self.distinct = false;
        self.order_by.clear();
        self.order_direction = OrderDirection::Asc;
        self.skip = None;
        self.limit = None;
        self.case = CaseState::default();
        self.errors.clear();
        self.parameters.clear();
        self.aggregation.reset();
        self
    }

    /// Whether any clause fragment has been recorded.
    pub fn has_queries(&self) -> bool {
        !self.fragments.is_empty()
    }

    // ---- Parameters ------------------------------------------------------

    /// Binds one parameter, overwriting an earlier value for the same key.
    pub fn param(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> &mut Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Merges `params` into the bound parameter map.
    pub fn params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        for (k, v) in params {
            self.parameters.insert(k.into(), v.into());
        }
        self
    }

    // ---- Node patterns ---------------------------------------------------

    /// Sets the anchor clause, rendered verbatim before every fragment.
    ///
    /// The identifier left of `=` (e.g. `n` in `START n=node(1)`) is
    /// registered for RETURN.
    pub fn start<I, K, V>(&mut self, anchor: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.start = anchor.to_owned();
        let identifier = anchor
            .trim()
            .trim_start_matches("START")
            .split('=')
            .next()
            .unwrap_or_default()
            .trim();
        if !identifier.is_empty() && anchor.contains('=') {
            self.register(identifier);
        }
        self.params(params)
    }

    pub fn match_(&mut self, placeholder: &str, label: &str, props: impl Into<Properties>) -> &mut Self {
        self.node_clause(NodeClause::Match, placeholder, label, &props.into())
    }

    pub fn optional_match(
        &mut self,
        placeholder: &str,
        label: &str,
        props: impl Into<Properties>,
    ) -> &mut Self {
        self.node_clause(NodeClause::OptionalMatch, placeholder, label, &props.into())
    }

    pub fn create(&mut self, placeholder: &str, label: &str, props: impl Into<Properties>) -> &mut Self {
        self.node_clause(NodeClause::Create, placeholder, label, &props.into())
    }

    pub fn merge(&mut self, placeholder: &str, label: &str, props: impl Into<Properties>) -> &mut Self {
        self.node_clause(NodeClause::Merge, placeholder, label, &props.into())
    }

    fn node_clause(
        &mut self,
        clause: NodeClause,
        placeholder: &str,
        label: &str,
        props: &Properties,
    ) -> &mut Self {
        let pattern = node_pattern(placeholder, label, props);
        self.fragments.push(format!(" {} {pattern}", clause.keyword()));
        self.register(placeholder);
        self
    }

    // ---- Relationships ---------------------------------------------------

    /// Appends ` (a)-[rel:LABEL {..}]-(b)`. No-op with fewer than two nodes.
    pub fn related(
        &mut self,
        nodes: &[&str],
        rel_placeholder: &str,
        rel_label: &str,
        props: impl Into<Properties>,
    ) -> &mut Self {
        let [from, to, ..] = nodes else {
            return self;
        };
        let rel = relationship_body(rel_placeholder, rel_label, &props.into());
        self.fragments.push(format!(" ({from})-[{rel}]-({to})"));
        self
    }

    /// Opens a relationship glued onto the previous pattern: `-[ar:LABEL]-`.
    ///
    /// Close it with [`to_node`](Self::to_node).
    pub fn relate(&mut self, rel_placeholder: &str, rel_label: &str, props: impl Into<Properties>) -> &mut Self {
        let placeholder = if rel_placeholder.is_empty() {
            DEFAULT_RELATE_PLACEHOLDER
        } else {
            rel_placeholder
        };
        let rel = relationship_body(placeholder, rel_label, &props.into());
        self.fragments.push(format!("-[{rel}]-"));
        self.register(placeholder);
        self
    }

    /// Closes a pattern opened with [`relate`](Self::relate).
    pub fn to_node(&mut self, placeholder: &str, label: &str, props: impl Into<Properties>) -> &mut Self {
        self.fragments.push(node_pattern(placeholder, label, &props.into()));
        self.register(placeholder);
        self
    }

    /// Appends ` MERGE (a)-[r:LABEL {..}]-(b)`. No-op with fewer than two nodes.
    pub fn merge_relationship(
        &mut self,
        nodes: &[&str],
        placeholder: &str,
        label: &str,
        props: impl Into<Properties>,
    ) -> &mut Self {
        let [from, to, ..] = nodes else {
            return self;
        };
        let placeholder = if placeholder.is_empty() {
            DEFAULT_MERGE_RELATIONSHIP_PLACEHOLDER
        } else {
            placeholder
        };
        let rel = relationship_body(placeholder, label, &props.into());
        self.fragments.push(format!(" MERGE ({from})-[{rel}]-({to})"));
        self.register(placeholder);
        self
    }

    pub fn on_create(&mut self, command: &str) -> &mut Self {
        self.push_keyword("ON CREATE", command)
    }

    pub fn on_match(&mut self, command: &str) -> &mut Self {
        self.push_keyword("ON MATCH", command)
    }

    // ---- Clause lists ----------------------------------------------------

    pub fn delete<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_list("DELETE", items)
    }

    pub fn with<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_list("WITH", items)
    }

    /// Removes labels or properties, e.g. `["u:Admin", "u.age"]`.
    pub fn remove<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_list("REMOVE", items)
    }

    /// Appends ` SET u.k = v, ...`. No-op without a placeholder or properties.
    pub fn set(&mut self, placeholder: &str, props: impl Into<Properties>) -> &mut Self {
        let props = props.into();
        if placeholder.is_empty() || props.is_empty() {
            return self;
        }
        let assignments = prepare_parameter(&format!("{placeholder}."), &props);
        self.fragments.push(format!(" SET {assignments}"));
        self
    }

    pub fn foreach(&mut self, condition: &str, query: &str) -> &mut Self {
        if !condition.is_empty() && !query.is_empty() {
            self.fragments.push(format!(" FOREACH ({condition} | {query})"));
        }
        self
    }

    pub fn index_on(&mut self, action: IndexAction, label: &str, property: &str) -> &mut Self {
        if !label.is_empty() && !property.is_empty() {
            self.fragments
                .push(format!(" {} INDEX ON :{label}({property})", action.keyword()));
        }
        self
    }

    // ---- WHERE family ----------------------------------------------------

    pub fn where_<I, K, V>(&mut self, condition: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.push_keyword("WHERE", condition).params(params)
    }

    pub fn where_not<I, K, V>(&mut self, condition: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.push_keyword("WHERE NOT", condition).params(params)
    }

    pub fn where_and<I, K, V>(&mut self, condition: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.push_keyword("AND", condition).params(params)
    }

    /// Adds ` WHERE prop IN [v1, v2]`, rendered after all fragments.
    pub fn where_in<I, V>(&mut self, property: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<PropertyValue>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| render_value(&v.into()))
            .collect();
        if !property.is_empty() && !values.is_empty() {
            self.where_text
                .push_str(&format!(" WHERE {property} IN [{}]", values.join(", ")));
        }
        self
    }

    pub fn starts_with(&mut self, value: &str) -> &mut Self {
        self.push_string_predicate("STARTS WITH", value)
    }

    pub fn ends_with(&mut self, value: &str) -> &mut Self {
        self.push_string_predicate("ENDS WITH", value)
    }

    pub fn contains(&mut self, value: &str) -> &mut Self {
        self.push_string_predicate("CONTAINS", value)
    }

    // ---- CASE expression -------------------------------------------------

    /// Opens a CASE expression. With a field it is a simple CASE, without
    /// one a generic CASE whose `when` calls must name the field.
    pub fn case(&mut self, field: Option<&str>) -> &mut Self {
        self.case = match field.filter(|f| !f.is_empty()) {
            Some(field) => {
                self.fragments.push(format!(" CASE {field}"));
                CaseState {
                    kind: CaseKind::Simple,
                    ..CaseState::default()
                }
            }
            None => {
                self.fragments.push(" CASE".to_owned());
                CaseState {
                    kind: CaseKind::Generic,
                    ..CaseState::default()
                }
            }
        };
        self
    }

    pub fn when(&mut self, value: impl Into<PropertyValue>, field: Option<&str>) -> &mut Self {
        let value = value.into();
        if value.is_null() {
            return self.record(BuilderErrorKind::NoValue, "when");
        }
        let rendered = render_value(&value);
        let fragment = match (self.case.kind, field.filter(|f| !f.is_empty())) {
            (CaseKind::None, _) => return self.record(BuilderErrorKind::CaseNotOpen, "when"),
            (CaseKind::Generic, None) => {
                return self.record(BuilderErrorKind::GenericCaseFieldMissing, "when");
            }
            (CaseKind::Generic, Some(field)) => format!(" WHEN {field} = {rendered}"),
            (CaseKind::Simple, _) => format!(" WHEN {rendered}"),
        };
        self.fragments.push(fragment);
        self.case.when_seen = true;
        self
    }

    pub fn then(&mut self, value: impl Into<PropertyValue>) -> &mut Self {
        let value = value.into();
        if value.is_null() {
            return self.record(BuilderErrorKind::NoValue, "then");
        }
        if !self.case.when_seen {
            return self.record(BuilderErrorKind::ThenBeforeWhen, "then");
        }
        self.fragments.push(format!(" THEN {}", render_value(&value)));
        self.case.then_seen = true;
        self
    }

    /// Appends ` ELSE value` whenever the value is not null.
    pub fn else_(&mut self, value: impl Into<PropertyValue>) -> &mut Self {
        let value = value.into();
        if !value.is_null() {
            self.fragments.push(format!(" ELSE {}", render_value(&value)));
        }
        self
    }

    /// Closes the CASE expression. Requires a successful `when` and `then`.
    pub fn end(&mut self) -> &mut Self {
        if !self.case.when_seen || !self.case.then_seen {
            return self.record(BuilderErrorKind::EndBeforeWhenThen, "end");
        }
        self.fragments.push(" END".to_owned());
        self.case = CaseState::default();
        self
    }

    pub fn case_kind(&self) -> CaseKind {
        self.case.kind
    }

    // ---- Functions -------------------------------------------------------

    pub fn all(&mut self, variable: &str, list: &str, predicate: &str) -> &mut Self {
        self.push_fragment(functions::predicate(Predicate::All, variable, list, predicate))
    }

    pub fn any(&mut self, variable: &str, list: &str, predicate: &str) -> &mut Self {
        self.push_fragment(functions::predicate(Predicate::Any, variable, list, predicate))
    }

    pub fn none(&mut self, variable: &str, list: &str, predicate: &str) -> &mut Self {
        self.push_fragment(functions::predicate(Predicate::None, variable, list, predicate))
    }

    pub fn single(&mut self, variable: &str, list: &str, predicate: &str) -> &mut Self {
        self.push_fragment(functions::predicate(Predicate::Single, variable, list, predicate))
    }

    pub fn exists(&mut self, pattern: &str, as_name: Option<&str>) -> &mut Self {
        self.push_fragment(functions::exists(pattern, as_name))
    }

    pub fn size(&mut self, of: impl Into<SizeOf>, as_name: Option<&str>) -> &mut Self {
        self.push_fragment(functions::size(&of.into(), as_name))
    }

    // ---- Aggregations ----------------------------------------------------

    /// Adds an aggregate function to the RETURN projection.
    pub fn aggregate(
        &mut self,
        func: Aggregate,
        expression: &str,
        distinct: bool,
        value: Option<&str>,
    ) -> &mut Self {
        self.aggregation.aggregate(func, expression, distinct, value);
        self
    }

    pub fn count(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::Count, expression, distinct, value)
    }

    pub fn sum(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::Sum, expression, distinct, value)
    }

    pub fn avg(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::Avg, expression, distinct, value)
    }

    pub fn stdev(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::StDev, expression, distinct, value)
    }

    pub fn stdevp(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::StDevP, expression, distinct, value)
    }

    pub fn max(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::Max, expression, distinct, value)
    }

    pub fn min(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::Min, expression, distinct, value)
    }

    pub fn collect(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::Collect, expression, distinct, value)
    }

    pub fn percentile_disc(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::PercentileDisc, expression, distinct, value)
    }

    pub fn percentile_cont(&mut self, expression: &str, distinct: bool, value: Option<&str>) -> &mut Self {
        self.aggregate(Aggregate::PercentileCont, expression, distinct, value)
    }

    // ---- Projection and paging -------------------------------------------

    /// Overrides the implicit RETURN list. An empty list is ignored.
    pub fn return_<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.trim().is_empty())
            .collect();
        if !items.is_empty() {
            self.explicit_return = Some(items);
        }
        self
    }

    /// Comma-separated form of [`return_`](Self::return_).
    pub fn return_str(&mut self, items: &str) -> &mut Self {
        self.return_(items.split(',').map(|s| s.trim().to_owned()))
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Sets the ORDER BY list. The direction only applies together with a
    /// non-empty list; an empty list leaves list and direction untouched.
    pub fn order_by<I, S>(&mut self, items: I, direction: Option<OrderDirection>) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return self;
        }
        self.order_by = items;
        if let Some(direction) = direction {
            self.order_direction = direction;
        }
        self
    }

    pub fn order_direction(&self) -> OrderDirection {
        self.order_direction
    }

    /// Ignored unless positive.
    pub fn skip(&mut self, n: i64) -> &mut Self {
        if let Ok(n @ 1..) = u64::try_from(n) {
            self.skip = Some(n);
        }
        self
    }

    /// Ignored unless positive.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        if let Ok(n @ 1..) = u64::try_from(n) {
            self.limit = Some(n);
        }
        self
    }

    // ---- Rendering -------------------------------------------------------

    /// Renders the query text. Does not mutate the builder.
    ///
    /// Returns an empty string when no fragment was recorded. The RETURN
    /// list is, in order of precedence: the explicit [`return_`] list, the
    /// implicit placeholders when `label_map` is empty, otherwise the
    /// aliases of `label_map`. Aggregations follow the list.
    ///
    /// [`return_`]: Self::return_
    pub fn get_query(&self, label_map: Option<&LabelMap>) -> String {
        if self.fragments.is_empty() {
            return String::new();
        }

        let mut query = String::new();
        query.push_str(&self.start);
        self.fragments.iter().for_each(|f| query.push_str(f));
        query.push_str(&self.where_text);

        let aggregated = self.aggregation.render();
        let mut projection: Vec<&str> = match (&self.explicit_return, label_map) {
            (Some(items), _) => items.iter().map(String::as_str).collect(),
            (None, Some(map)) if !map.is_empty() => map.aliases(),
            (None, _) => self.placeholders.iter().map(String::as_str).collect(),
        };
        if !aggregated.is_empty() {
            projection.push(&aggregated);
        }
        if !projection.is_empty() {
            query.push_str(" RETURN ");
            if self.distinct {
                query.push_str("DISTINCT ");
            }
            query.push_str(&projection.join(", "));
        }

        if !self.order_by.is_empty() {
            query.push_str(&format!(
                " ORDER BY {} {}",
                self.order_by.join(", "),
                self.order_direction.as_str()
            ));
        }
        if let Some(skip) = self.skip {
            query.push_str(&format!(" SKIP {skip}"));
        }
        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }
        query
    }

    /// Owned copy of the bound parameters.
    pub fn get_parameters(&self) -> Parameters {
        self.parameters.clone()
    }

    pub fn errors(&self) -> &[BuilderError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    // ---- Internals -------------------------------------------------------

    /// Registers a placeholder for the implicit RETURN list. Anonymous
    /// patterns and repeated placeholders are skipped.
    fn register(&mut self, placeholder: &str) {
        if !placeholder.is_empty() && !self.placeholders.iter().any(|p| p == placeholder) {
            self.placeholders.push(placeholder.to_owned());
        }
    }

    fn record(&mut self, kind: BuilderErrorKind, method: &'static str) -> &mut Self {
        tracing::debug!(method, code = kind.code(), "builder usage error recorded");
        self.errors.push(BuilderError::new(kind, method));
        self
    }

    fn push_fragment(&mut self, fragment: String) -> &mut Self {
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
        self
    }

    fn push_keyword(&mut self, keyword: &str, body: &str) -> &mut Self {
        if body.is_empty() {
            return self;
        }
        self.push_fragment(format!(" {keyword} {body}"))
    }

    fn push_list<I, S>(&mut self, keyword: &str, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<String> = items
            .into_iter()
            .map(|s| s.as_ref().trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            return self;
        }
        self.push_keyword(keyword, &items.join(", "))
    }

    fn push_string_predicate(&mut self, keyword: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            return self;
        }
        let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
        self.push_fragment(format!(" {keyword} '{escaped}'"))
    }
}

/// `(placeholder:Label {k: v})`, label and property block omitted when empty.
fn node_pattern(placeholder: &str, label: &str, props: &Properties) -> String {
    let mut out = format!("({placeholder}");
    push_label_and_props(&mut out, label, props);
    out.push(')');
    out
}

/// Inside of `[...]` for a relationship pattern.
fn relationship_body(placeholder: &str, label: &str, props: &Properties) -> String {
    let mut out = placeholder.to_owned();
    push_label_and_props(&mut out, label, props);
    out
}

fn push_label_and_props(out: &mut String, label: &str, props: &Properties) {
    if !label.is_empty() {
        out.push(':');
        out.push_str(label);
    }
    if !props.is_empty() {
        out.push(' ');
        out.push_str(&prepare_parameter(":", props));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user(name: &str) -> Properties {
        Properties::new().with("firstName", name)
    }

    #[test]
    fn match_without_props_renders_bare_pattern() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new());
        assert_eq!(qb.get_query(None), " MATCH (u:User) RETURN u");
    }

    #[test]
    fn fragments_follow_call_order() {
        let mut qb = QueryBuilder::new();
        qb.create("a", "Account", Properties::new())
            .match_("u", "User", Properties::new())
            .merge("t", "Tag", Properties::new())
            .optional_match("p", "Post", Properties::new());
        assert_eq!(
            qb.get_query(None),
            " CREATE (a:Account) MATCH (u:User) MERGE (t:Tag) OPTIONAL MATCH (p:Post) RETURN a, u, t, p"
        );
    }

    #[test]
    fn merge_and_match_render_same_pattern() {
        let mut merged = QueryBuilder::new();
        merged.merge("u", "User", user("Gabi"));
        let mut matched = QueryBuilder::new();
        matched.match_("u", "User", user("Gabi"));

        let merged = merged.get_query(None);
        let matched = matched.get_query(None);
        assert_eq!(merged, r#" MERGE (u:User {firstName: "Gabi"}) RETURN u"#);
        assert_eq!(
            merged.trim_start_matches(" MERGE"),
            matched.trim_start_matches(" MATCH")
        );
    }

    #[test]
    fn empty_label_and_anonymous_placeholder() {
        let mut qb = QueryBuilder::new();
        qb.match_("n", "", Properties::new())
            .match_("", "Tag", Properties::new());
        assert_eq!(qb.get_query(None), " MATCH (n) MATCH (:Tag) RETURN n");
    }

    #[test]
    fn reset_clears_query_and_parameters() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .where_("u.age > {age}", [("age", 30)])
            .count("u", false, None)
            .order_by(["u.age"], Some(OrderDirection::Desc))
            .limit(10)
            .then("x");
        assert!(qb.has_errors());

        qb.reset();
        assert_eq!(qb.get_query(None), "");
        assert!(qb.get_parameters().is_empty());
        assert!(qb.errors().is_empty());
        assert_eq!(qb.order_direction(), OrderDirection::Asc);

        qb.match_("n", "", Properties::new());
        assert_eq!(qb.get_query(None), " MATCH (n) RETURN n");
    }

    #[test]
    fn end_to_end_where_with_parameters() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .where_("u.firstName = {firstName}", [("firstname", "Gabi")]);

        let query = qb.get_query(None);
        assert!(query.contains("MATCH (u:User)"));
        assert!(query.contains("WHERE u.firstName = {firstName}"));
        assert_eq!(
            qb.get_parameters(),
            Parameters::from([("firstname".to_owned(), json!("Gabi"))])
        );
    }

    #[test]
    fn parameters_merge_and_overwrite() {
        let mut qb = QueryBuilder::new();
        qb.where_("a = {x}", [("x", 1)])
            .where_and("b = {y}", [("y", 2)])
            .where_not("c = {x}", [("x", 3)]);
        let params = qb.get_parameters();
        assert_eq!(params.len(), 2);
        assert_eq!(params["x"], json!(3));
        assert_eq!(params["y"], json!(2));
    }

    #[test]
    fn get_parameters_returns_owned_copy() {
        let mut qb = QueryBuilder::new();
        qb.param("a", 1);
        let mut copy = qb.get_parameters();
        copy.insert("b".to_owned(), json!(2));
        assert_eq!(qb.get_parameters().len(), 1);
    }

    #[test]
    fn where_family_fragments() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .where_("u.age > 18", NO_PARAMS)
            .where_and("u.active = true", NO_PARAMS)
            .where_not("", NO_PARAMS);
        assert_eq!(
            qb.get_query(None),
            " MATCH (u:User) WHERE u.age > 18 AND u.active = true RETURN u"
        );
    }

    #[test]
    fn where_in_renders_after_fragments() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .where_in("u.name", ["Gabi", "Ann"])
            .with(["u"]);
        assert_eq!(
            qb.get_query(None),
            r#" MATCH (u:User) WITH u WHERE u.name IN ["Gabi", "Ann"] RETURN u"#
        );

        let mut qb = QueryBuilder::new();
        qb.match_("u", "", Properties::new())
            .where_in("u.age", Vec::<i64>::new());
        assert_eq!(qb.get_query(None), " MATCH (u) RETURN u");
    }

    #[test]
    fn set_uses_assignment_layout() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", user("Gabi"))
            .set("u", Properties::new().with("age", 31).with("city", "Berlin"));
        assert_eq!(
            qb.get_query(None),
            r#" MATCH (u:User {firstName: "Gabi"}) SET u.age = 31, u.city = "Berlin" RETURN u"#
        );
    }

    #[test]
    fn related_needs_two_nodes() {
        let mut qb = QueryBuilder::new();
        qb.match_("a", "", Properties::new())
            .related(&["a"], "r", "KNOWS", Properties::new());
        assert_eq!(qb.get_query(None), " MATCH (a) RETURN a");

        qb.related(&["a", "b"], "r", "KNOWS", Properties::new().with("since", 2020));
        assert_eq!(
            qb.get_query(None),
            " MATCH (a) (a)-[r:KNOWS {since: 2020}]-(b) RETURN a"
        );
    }

    #[test]
    fn relate_and_to_node_glue_onto_pattern() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .relate("", "WROTE", Properties::new())
            .to_node("p", "Post", Properties::new().with("draft", false));
        assert_eq!(
            qb.get_query(None),
            " MATCH (u:User)-[ar:WROTE]-(p:Post {draft: false}) RETURN u, ar, p"
        );
    }

    #[test]
    fn merge_relationship_defaults_placeholder() {
        let mut qb = QueryBuilder::new();
        qb.match_("a", "User", Properties::new())
            .match_("b", "User", Properties::new())
            .merge_relationship(&["a", "b"], "", "FOLLOWS", Properties::new())
            .on_create("SET r.created = timestamp()")
            .on_match("");
        assert_eq!(
            qb.get_query(None),
            " MATCH (a:User) MATCH (b:User) MERGE (a)-[r:FOLLOWS]-(b) ON CREATE SET r.created = timestamp() RETURN a, b, r"
        );

        let mut qb = QueryBuilder::new();
        qb.merge_relationship(&["a"], "x", "L", Properties::new());
        assert!(!qb.has_queries());
    }

    #[test]
    fn references_render_unquoted_in_properties() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .create("n", "Note", Properties::new().with("title", "hi").with_reference("owner", "u.id"));
        assert_eq!(
            qb.get_query(None),
            r#" MATCH (u:User) CREATE (n:Note {title: "hi", owner: u.id}) RETURN u, n"#
        );
    }

    #[test]
    fn delete_with_remove_skip_empty_input() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .remove(["u:Admin", "u.age"])
            .delete(Vec::<String>::new())
            .with(["u", ""])
            .delete(["u"]);
        assert_eq!(
            qb.get_query(None),
            " MATCH (u:User) REMOVE u:Admin, u.age WITH u DELETE u RETURN u"
        );
    }

    #[test]
    fn start_anchor_is_registered() {
        let mut qb = QueryBuilder::new();
        qb.start("START n=node({id})", [("id", 7)])
            .match_("m", "Tag", Properties::new());
        assert_eq!(
            qb.get_query(None),
            "START n=node({id}) MATCH (m:Tag) RETURN n, m"
        );
        assert_eq!(qb.get_parameters()["id"], json!(7));

        let mut qb = QueryBuilder::new();
        qb.start("START n=node(1)", NO_PARAMS);
        assert_eq!(qb.get_query(None), "");
    }

    #[test]
    fn projection_precedence() {
        let labels = LabelMap::from([("u", "user"), ("v", "user"), ("n", "count(n)")]);

        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new());
        assert_eq!(qb.get_query(Some(&labels)), " MATCH (u:User) RETURN user, count(n)");
        assert_eq!(qb.get_query(Some(&LabelMap::new())), " MATCH (u:User) RETURN u");

        qb.return_str("u.name, u.age");
        assert_eq!(qb.get_query(Some(&labels)), " MATCH (u:User) RETURN u.name, u.age");
    }

    #[test]
    fn placeholders_are_deduplicated() {
        let mut qb = QueryBuilder::new();
        qb.merge("u", "User", user("Gabi"))
            .match_("u", "User", Properties::new());
        assert!(qb.get_query(None).ends_with(" RETURN u"));
    }

    #[test]
    fn distinct_order_skip_limit() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .distinct()
            .order_by(["u.name", "u.age"], Some(OrderDirection::Desc))
            .skip(5)
            .limit(10);
        assert_eq!(
            qb.get_query(None),
            " MATCH (u:User) RETURN DISTINCT u ORDER BY u.name, u.age DESC SKIP 5 LIMIT 10"
        );
    }

    #[test]
    fn skip_and_limit_ignore_non_positive() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "", Properties::new()).skip(3).skip(0).limit(-2);
        assert_eq!(qb.get_query(None), " MATCH (u) RETURN u SKIP 3");
    }

    #[test]
    fn order_direction_needs_non_empty_list() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "", Properties::new())
            .order_by(Vec::<String>::new(), Some(OrderDirection::Desc));
        assert_eq!(qb.order_direction(), OrderDirection::Asc);
        assert_eq!(qb.get_query(None), " MATCH (u) RETURN u");

        qb.order_by(["u.name"], None);
        assert_eq!(qb.get_query(None), " MATCH (u) RETURN u ORDER BY u.name ASC");
    }

    #[test]
    fn then_before_when_is_recorded() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "", Properties::new()).then("x");
        assert_eq!(qb.errors().len(), 1);
        assert_eq!(qb.errors()[0].kind, BuilderErrorKind::ThenBeforeWhen);
        assert_eq!(qb.errors()[0].code(), 1202);
        assert!(!qb.get_query(None).contains("THEN"));
    }

    #[test]
    fn end_requires_when_and_then() {
        let mut qb = QueryBuilder::new();
        qb.with(["u"]).case(Some("u.role")).end();
        assert_eq!(qb.errors()[0].kind, BuilderErrorKind::EndBeforeWhenThen);
        assert!(!qb.get_query(None).contains("END"));

        qb.when("admin", None).end();
        assert_eq!(qb.errors().len(), 2);

        qb.then(1).end();
        assert_eq!(qb.errors().len(), 2);
        assert_eq!(qb.get_query(None).matches(" END").count(), 1);
    }

    #[test]
    fn simple_case_renders_full_expression() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .return_(["u.name"])
            .with(["u"])
            .case(Some("u.role"))
            .when("admin", None)
            .then(1)
            .else_(0)
            .end();
        assert!(!qb.has_errors());
        assert_eq!(
            qb.get_query(None),
            r#" MATCH (u:User) WITH u CASE u.role WHEN "admin" THEN 1 ELSE 0 END RETURN u.name"#
        );
        assert_eq!(qb.case_kind(), CaseKind::None);
    }

    #[test]
    fn generic_case_requires_field() {
        let mut qb = QueryBuilder::new();
        qb.with(["u"]).case(None).when(18, None);
        assert_eq!(qb.errors()[0].kind, BuilderErrorKind::GenericCaseFieldMissing);
        assert_eq!(qb.errors()[0].method, "when");

        qb.when(18, Some("u.age")).then("adult");
        assert_eq!(qb.errors().len(), 1);
        assert!(qb.get_query(None).contains(r#" CASE WHEN u.age = 18 THEN "adult""#));
    }

    #[test]
    fn null_values_and_missing_case() {
        let mut qb = QueryBuilder::new();
        qb.when("x", None)
            .case(Some("n"))
            .when(Option::<i64>::None, None)
            .then(serde_json::Value::Null)
            .else_(Option::<&str>::None);
        let kinds: Vec<BuilderErrorKind> = qb.errors().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BuilderErrorKind::CaseNotOpen,
                BuilderErrorKind::NoValue,
                BuilderErrorKind::NoValue,
            ]
        );
        assert!(!qb.get_query(None).contains("ELSE"));
    }

    #[test]
    fn predicates_and_scalar_functions_append() {
        let mut qb = QueryBuilder::new();
        qb.match_("p", "", Properties::new())
            .where_("", NO_PARAMS)
            .where_("length(p) > 1", NO_PARAMS)
            .where_and("", NO_PARAMS)
            .all("n", "nodes(p)", "age > 30")
            .exists("", None);
        assert_eq!(
            qb.get_query(None),
            " MATCH (p) WHERE length(p) > 1 ALL (n IN nodes(p) WHERE n.age > 30) RETURN p"
        );

        let mut qb = QueryBuilder::new();
        qb.with(["n"]).size("(n)-->()", Some("degree"));
        assert_eq!(qb.get_query(None), " WITH n SIZE ((n)-->()) AS degree");
    }

    #[test]
    fn aggregations_join_the_projection() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .count("u", true, None)
            .percentile_cont("u.age", false, Some("0.9"));
        assert_eq!(
            qb.get_query(None),
            " MATCH (u:User) RETURN u, count(DISTINCT u), percentileCont(u.age, 0.9)"
        );
    }

    #[test]
    fn empty_aggregation_expression_adds_nothing() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new()).count("", false, None);
        assert_eq!(qb.get_query(None), " MATCH (u:User) RETURN u");
    }

    #[test]
    fn index_without_projection_omits_return() {
        let mut qb = QueryBuilder::new();
        qb.index_on(IndexAction::Create, "User", "email");
        assert_eq!(qb.get_query(None), " CREATE INDEX ON :User(email)");

        qb.reset().index_on(IndexAction::Drop, "User", "");
        assert_eq!(qb.get_query(None), "");
        qb.index_on(IndexAction::Drop, "User", "email");
        assert_eq!(qb.get_query(None), " DROP INDEX ON :User(email)");
    }

    #[test]
    fn string_predicates_and_foreach() {
        let mut qb = QueryBuilder::new();
        qb.match_("u", "User", Properties::new())
            .where_("u.name", NO_PARAMS)
            .starts_with("O'B")
            .ends_with("")
            .foreach("n IN nodes(p)", "SET n.seen = true")
            .foreach("", "SET n.x = 1");
        assert_eq!(
            qb.get_query(None),
            r" MATCH (u:User) WHERE u.name STARTS WITH 'O\'B' FOREACH (n IN nodes(p) | SET n.seen = true) RETURN u"
        );
    }

    #[test]
    fn unbuilt_query_renders_empty() {
        let mut qb = QueryBuilder::new();
        qb.count("n", false, None).distinct().limit(3);
        assert_eq!(qb.get_query(None), "");
    }
}
