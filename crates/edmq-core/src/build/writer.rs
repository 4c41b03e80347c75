use crate::{
    build::{
        BuildError,
        literal::{encode_literal, escape_query_value},
    },
    syntax::token::{
        ExpandLevels, ExpandTermToken, ExpandToken, InlineCountKind, NamedValue, OrderByToken,
        OrderDirection, PathSegmentToken, QueryDescriptorToken, QueryOptionClause, QueryToken,
        SelectToken, UnaryOperatorKind,
    },
};
use std::fmt::Write as _;

///
/// UriBuilder
///
/// Appends a resource path and query options. Each option gets exactly
/// one separator, `?` for the first and `&` after, in call order.
///

#[derive(Debug, Default)]
pub struct UriBuilder {
    out: String,
    options: usize,
}

impl UriBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a whole parsed URI, options in their original order.
    pub fn build(descriptor: &QueryDescriptorToken) -> Result<String, BuildError> {
        let mut builder = Self::new();
        if let Some(path) = &descriptor.path {
            builder.path(path)?;
        }
        for option in &descriptor.options {
            builder.option(option)?;
        }

        Ok(builder.finish())
    }

    pub fn path(&mut self, leaf: &PathSegmentToken) -> Result<&mut Self, BuildError> {
        self.out.push_str(&write_path(leaf)?);
        Ok(self)
    }

    pub fn option(&mut self, clause: &QueryOptionClause) -> Result<&mut Self, BuildError> {
        let (name, value) = match clause {
            QueryOptionClause::Filter(token) => ("$filter", write_filter(token)?),
            QueryOptionClause::OrderBy(items) => ("$orderby", write_orderby(items)?),
            QueryOptionClause::Select(select) => ("$select", write_select(select)?),
            QueryOptionClause::Expand(expand) => ("$expand", write_expand(expand)?),
            QueryOptionClause::Top(n) => ("$top", n.to_string()),
            QueryOptionClause::Skip(n) => ("$skip", n.to_string()),
            QueryOptionClause::Count(b) => ("$count", b.to_string()),
            QueryOptionClause::InlineCount(kind) => ("$inlinecount", inline_count(*kind).to_string()),
            QueryOptionClause::Format(v) => ("$format", escape_query_value(v)),
            QueryOptionClause::SkipToken(v) => ("$skiptoken", escape_query_value(v)),
            QueryOptionClause::Search(v) => ("$search", escape_query_value(v)),
            QueryOptionClause::Custom(custom) => {
                let name = escape_query_value(&custom.name);
                let value = escape_query_value(&custom.value);
                self.raw_option(&name, &value);
                return Ok(self);
            }
        };
        self.raw_option(name, &value);

        Ok(self)
    }

    /// Append `name=value` without further escaping.
    pub fn raw_option(&mut self, name: &str, value: &str) -> &mut Self {
        self.out.push(if self.options == 0 { '?' } else { '&' });
        self.options += 1;
        let _ = write!(self.out, "{name}={value}");

        self
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

const fn inline_count(kind: InlineCountKind) -> &'static str {
    match kind {
        InlineCountKind::AllPages => "allpages",
        InlineCountKind::None => "none",
    }
}

//
// expressions
//

pub fn write_filter(token: &QueryToken) -> Result<String, BuildError> {
    let mut out = String::new();
    expression(&mut out, token)?;

    Ok(out)
}

pub fn write_orderby(items: &[OrderByToken]) -> Result<String, BuildError> {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        operand(&mut out, &item.expression)?;
        if item.direction == OrderDirection::Descending {
            out.push_str("%20desc");
        }
    }

    Ok(out)
}

fn expression(out: &mut String, token: &QueryToken) -> Result<(), BuildError> {
    match token {
        QueryToken::Literal(literal) => out.push_str(&encode_literal(&literal.value)?),
        QueryToken::PropertyAccess { name, parent } => {
            member_parent(out, parent.as_deref())?;
            out.push_str(name);
        }
        QueryToken::FunctionCall {
            name,
            arguments,
            parent,
        } => {
            member_parent(out, parent.as_deref())?;
            out.push_str(name);
            out.push('(');
            for (i, argument) in arguments.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                operand(out, argument)?;
            }
            out.push(')');
        }
        QueryToken::BinaryOperator { op, left, right } => {
            let precedence = op.precedence();
            child(out, left, |p| p < precedence)?;
            let _ = write!(out, "%20{}%20", op.keyword());
            // operators are left-associative
            child(out, right, |p| p <= precedence)?;
        }
        QueryToken::UnaryOperator { op, operand: inner } => {
            let mut rendered = String::new();
            operand(&mut rendered, inner)?;
            let wrap = matches!(inner.as_ref(), QueryToken::BinaryOperator { .. })
                || (*op == UnaryOperatorKind::Negate
                    && (matches!(inner.as_ref(), QueryToken::UnaryOperator { .. })
                        || rendered.starts_with('-')));

            out.push_str(match op {
                UnaryOperatorKind::Negate => "-",
                UnaryOperatorKind::Not => "not%20",
            });
            if wrap {
                let _ = write!(out, "({rendered})");
            } else {
                out.push_str(&rendered);
            }
        }
        QueryToken::Star { parent } => {
            member_parent(out, parent.as_deref())?;
            out.push('*');
        }
    }

    Ok(())
}

/// A value position; a bare `*` is only valid as a member path.
fn operand(out: &mut String, token: &QueryToken) -> Result<(), BuildError> {
    if matches!(token, QueryToken::Star { parent: None }) {
        return Err(BuildError::unrenderable("'*' used as a value"));
    }

    expression(out, token)
}

fn child(
    out: &mut String,
    token: &QueryToken,
    needs_parens: impl Fn(u8) -> bool,
) -> Result<(), BuildError> {
    match token {
        QueryToken::BinaryOperator { op, .. } if needs_parens(op.precedence()) => {
            out.push('(');
            operand(out, token)?;
            out.push(')');
            Ok(())
        }
        _ => operand(out, token),
    }
}

fn member_parent(out: &mut String, parent: Option<&QueryToken>) -> Result<(), BuildError> {
    let Some(parent) = parent else {
        return Ok(());
    };
    if matches!(
        parent,
        QueryToken::BinaryOperator { .. } | QueryToken::UnaryOperator { .. } | QueryToken::Literal(_)
    ) {
        return Err(BuildError::unrenderable(format!(
            "member access on {}",
            write_filter(parent).unwrap_or_else(|_| "an operator".to_string())
        )));
    }

    expression(out, parent)?;
    out.push('/');

    Ok(())
}

//
// paths
//

/// Render a path given by its leaf segment.
pub fn write_path(leaf: &PathSegmentToken) -> Result<String, BuildError> {
    let mut segments: Vec<_> = std::iter::successors(Some(leaf), |s| s.parent()).collect();
    segments.reverse();

    let mut out = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(&segment.identifier());
        if let PathSegmentToken::Segment(segment) = segment
            && let Some(values) = &segment.named_values
        {
            out.push('(');
            named_values(&mut out, values)?;
            out.push(')');
        }
    }

    Ok(out)
}

fn named_values(out: &mut String, values: &[NamedValue]) -> Result<(), BuildError> {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if let Some(name) = &value.name {
            let _ = write!(out, "{name}=");
        }
        out.push_str(&encode_literal(&value.value.value)?);
    }

    Ok(())
}

//
// select / expand
//

pub fn write_select(select: &SelectToken) -> Result<String, BuildError> {
    let terms = select
        .terms
        .iter()
        .map(|term| write_path(&term.path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(terms.join(","))
}

pub fn write_expand(expand: &ExpandToken) -> Result<String, BuildError> {
    let terms = expand
        .terms
        .iter()
        .map(expand_term)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(terms.join(","))
}

fn expand_term(term: &ExpandTermToken) -> Result<String, BuildError> {
    let mut out = write_path(&term.path)?;

    let options = &term.options;
    let mut nested = Vec::new();
    if let Some(filter) = &options.filter {
        nested.push(format!("$filter={}", write_filter(filter)?));
    }
    if !options.orderby.is_empty() {
        nested.push(format!("$orderby={}", write_orderby(&options.orderby)?));
    }
    if let Some(top) = options.top {
        nested.push(format!("$top={top}"));
    }
    if let Some(skip) = options.skip {
        nested.push(format!("$skip={skip}"));
    }
    if let Some(count) = options.count {
        nested.push(format!("$count={count}"));
    }
    if let Some(levels) = options.levels {
        nested.push(match levels {
            ExpandLevels::Max => "$levels=max".to_string(),
            ExpandLevels::Depth(n) => format!("$levels={n}"),
        });
    }
    if let Some(search) = &options.search {
        nested.push(format!("$search={}", escape_query_value(search)));
    }
    if let Some(select) = &options.select {
        nested.push(format!("$select={}", write_select(select)?));
    }
    if let Some(expand) = &term.expand {
        nested.push(format!("$expand={}", write_expand(expand)?));
    }

    if !nested.is_empty() {
        let _ = write!(out, "({})", nested.join(";"));
    }

    Ok(out)
}
