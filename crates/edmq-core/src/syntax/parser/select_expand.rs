use crate::{
    settings::UriSettings,
    syntax::{
        SyntaxError,
        parser::{
            DepthGuard, find_open_paren, parse_filter, parse_orderby, path::parse_member_path,
            split_top_level,
        },
        token::{
            ExpandLevels, ExpandOptionsToken, ExpandTermToken, ExpandToken, SelectTermToken,
            SelectToken,
        },
    },
};

/// Parse a `$select` value into its comma-separated path terms.
pub fn parse_select(text: &str, settings: &UriSettings) -> Result<SelectToken, SyntaxError> {
    let mut terms = Vec::new();
    for part in split_top_level(text, ',')? {
        let part = part.trim();
        if part.is_empty() {
            return Err(SyntaxError::UnexpectedEnd {
                expected: "select item".to_string(),
            });
        }

        terms.push(SelectTermToken {
            path: parse_member_path(part, settings.max_path_segments)?,
        });
    }

    Ok(SelectToken { terms })
}

/// Parse an `$expand` value, including nested `(opt=value;...)` options.
pub fn parse_expand(text: &str, settings: &UriSettings) -> Result<ExpandToken, SyntaxError> {
    let mut guard = DepthGuard::new(settings.max_select_expand_depth);
    parse_expand_level(text, settings, &mut guard)
}

fn parse_expand_level(
    text: &str,
    settings: &UriSettings,
    guard: &mut DepthGuard,
) -> Result<ExpandToken, SyntaxError> {
    guard.enter()?;

    let mut terms = Vec::new();
    for part in split_top_level(text, ',')? {
        let part = part.trim();
        if part.is_empty() {
            return Err(SyntaxError::UnexpectedEnd {
                expected: "expand item".to_string(),
            });
        }
        terms.push(parse_expand_term(part, settings, guard)?);
    }

    guard.leave(1);
    Ok(ExpandToken { terms })
}

fn parse_expand_term(
    text: &str,
    settings: &UriSettings,
    guard: &mut DepthGuard,
) -> Result<ExpandTermToken, SyntaxError> {
    let Some(open) = find_open_paren(text) else {
        return Ok(ExpandTermToken::new(parse_member_path(
            text,
            settings.max_path_segments,
        )?));
    };

    let inner = text[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| SyntaxError::UnexpectedEnd {
            expected: "')'".to_string(),
        })?;
    let mut term = ExpandTermToken::new(parse_member_path(
        text[..open].trim_end(),
        settings.max_path_segments,
    )?);

    let mut seen: Vec<&str> = Vec::new();
    for option in split_top_level(inner, ';')? {
        let option = option.trim();
        if option.is_empty() {
            continue;
        }

        let (name, value) = option.split_once('=').ok_or_else(|| {
            SyntaxError::InvalidOptionValue {
                name: option.to_string(),
                value: String::new(),
            }
        })?;
        let (name, value) = (name.trim(), value.trim());

        if seen.contains(&name) {
            return Err(SyntaxError::DuplicateSystemOption {
                name: name.to_string(),
            });
        }
        seen.push(name);

        apply_expand_option(&mut term, name, value, settings, guard)?;
    }

    Ok(term)
}

fn apply_expand_option(
    term: &mut ExpandTermToken,
    name: &str,
    value: &str,
    settings: &UriSettings,
    guard: &mut DepthGuard,
) -> Result<(), SyntaxError> {
    let options: &mut ExpandOptionsToken = &mut term.options;

    match name {
        "$filter" => options.filter = Some(parse_filter(value, settings)?),
        "$orderby" => options.orderby = parse_orderby(value, settings)?,
        "$top" => options.top = Some(parse_non_negative(name, value)?),
        "$skip" => options.skip = Some(parse_non_negative(name, value)?),
        "$count" => options.count = Some(parse_bool(name, value)?),
        "$inlinecount" => {
            options.count = Some(match value {
                "allpages" => true,
                "none" => false,
                _ => return Err(invalid(name, value)),
            });
        }
        "$levels" => {
            options.levels = Some(if value == "max" {
                ExpandLevels::Max
            } else {
                ExpandLevels::Depth(value.parse().map_err(|_| invalid(name, value))?)
            });
        }
        "$search" => options.search = Some(value.to_string()),
        "$select" => options.select = Some(parse_select(value, settings)?),
        "$expand" => term.expand = Some(parse_expand_level(value, settings, guard)?),
        _ => {
            return Err(SyntaxError::UnknownSystemOption {
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

pub(crate) fn parse_non_negative(name: &str, value: &str) -> Result<i64, SyntaxError> {
    value
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| invalid(name, value))
}

pub(crate) fn parse_bool(name: &str, value: &str) -> Result<bool, SyntaxError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

pub(crate) fn invalid(name: &str, value: &str) -> SyntaxError {
    SyntaxError::InvalidOptionValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}
