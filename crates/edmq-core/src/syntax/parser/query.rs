use crate::{
    obs::sink::{self, QueryEvent, QueryOption},
    settings::UriSettings,
    syntax::{
        SyntaxError,
        parser::{
            parse_expand, parse_filter, parse_orderby, parse_resource_path, parse_select,
            select_expand::{invalid, parse_bool, parse_non_negative},
        },
        token::{InlineCountKind, QueryDescriptorToken, QueryOptionClause, QueryOptionToken},
    },
};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Parse a service-root-relative URI such as `People?$top=2&$select=Name`.
///
/// Options keep their source order. Names and values are percent-decoded
/// before parsing. Unknown `$`-options and repeated system options are
/// rejected; other options are kept as custom options.
pub fn parse_query(uri: &str, settings: &UriSettings) -> Result<QueryDescriptorToken, SyntaxError> {
    let (path, query) = uri.split_once('?').unwrap_or((uri, ""));

    let path = decode(path)?;
    let path = path.trim_matches('/');
    let path = if path.is_empty() {
        None
    } else {
        sink::record(QueryEvent::OptionParsed {
            option: QueryOption::Path,
        });
        Some(parse_resource_path(path, settings)?)
    };

    let mut options = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode(raw_name)?;
        let value = decode(raw_value)?;

        if name.starts_with('$') {
            if seen.iter().any(|s| *s == *name) {
                return Err(SyntaxError::DuplicateSystemOption {
                    name: name.into_owned(),
                });
            }
            seen.push(name.to_string());
        }

        let (option, clause) = parse_option(&name, &value, settings)?;
        tracing::trace!(option = option.label(), "parsed query option");
        sink::record(QueryEvent::OptionParsed { option });
        options.push(clause);
    }

    tracing::debug!(
        has_path = path.is_some(),
        options = options.len(),
        "parsed query descriptor"
    );

    Ok(QueryDescriptorToken { path, options })
}

fn parse_option(
    name: &str,
    value: &str,
    settings: &UriSettings,
) -> Result<(QueryOption, QueryOptionClause), SyntaxError> {
    let parsed = match name {
        "$filter" => (
            QueryOption::Filter,
            QueryOptionClause::Filter(parse_filter(value, settings)?),
        ),
        "$orderby" => (
            QueryOption::OrderBy,
            QueryOptionClause::OrderBy(parse_orderby(value, settings)?),
        ),
        "$select" => (
            QueryOption::Select,
            QueryOptionClause::Select(parse_select(value, settings)?),
        ),
        "$expand" => (
            QueryOption::Expand,
            QueryOptionClause::Expand(parse_expand(value, settings)?),
        ),
        "$top" => (
            QueryOption::Top,
            QueryOptionClause::Top(parse_non_negative(name, value)?),
        ),
        "$skip" => (
            QueryOption::Skip,
            QueryOptionClause::Skip(parse_non_negative(name, value)?),
        ),
        "$count" => (
            QueryOption::Count,
            QueryOptionClause::Count(parse_bool(name, value)?),
        ),
        "$inlinecount" => {
            let kind = match value {
                "allpages" => InlineCountKind::AllPages,
                "none" => InlineCountKind::None,
                _ => return Err(invalid(name, value)),
            };
            (QueryOption::InlineCount, QueryOptionClause::InlineCount(kind))
        }
        "$format" => (
            QueryOption::Format,
            QueryOptionClause::Format(value.to_string()),
        ),
        "$skiptoken" => (
            QueryOption::SkipToken,
            QueryOptionClause::SkipToken(value.to_string()),
        ),
        "$search" => (
            QueryOption::Search,
            QueryOptionClause::Search(value.to_string()),
        ),
        _ if name.starts_with('$') => {
            return Err(SyntaxError::UnknownSystemOption {
                name: name.to_string(),
            });
        }
        _ => (
            QueryOption::Custom,
            QueryOptionClause::Custom(QueryOptionToken {
                name: name.to_string(),
                value: value.to_string(),
            }),
        ),
    };

    Ok(parsed)
}

fn decode(text: &str) -> Result<Cow<'_, str>, SyntaxError> {
    percent_decode_str(text)
        .decode_utf8()
        .map_err(|_| SyntaxError::InvalidPercentEncoding {
            text: text.to_string(),
        })
}
