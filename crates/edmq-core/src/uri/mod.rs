//! Whole-pipeline entry point: text in, bound trees out.

use crate::{
    bind::{
        BindContext, BindError, ExpressionBinder, FilterClause, ODataPath, OrderByClause,
        PathSegment, ResolverPolicy, SelectExpandClause, bind_path, bind_select_expand,
    },
    edm::{EdmModel, EntityType, NavigationSource},
    error::QueryError,
    normalize::{normalize_expand, normalize_select},
    settings::UriSettings,
    syntax::{
        parser,
        token::{InlineCountKind, QueryOptionClause, QueryOptionToken},
    },
};
use std::sync::Arc;

#[cfg(test)]
mod tests;

///
/// ParsedUri
///
/// A request URI bound against one model. Options that were absent stay
/// `None`; unknown non-`$` options are kept verbatim in `custom`.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedUri {
    pub path: Option<ODataPath>,
    pub filter: Option<FilterClause>,
    pub orderby: Option<OrderByClause>,
    pub select_expand: Option<SelectExpandClause>,
    pub top: Option<i64>,
    pub skip: Option<i64>,
    pub count: Option<bool>,
    pub inline_count: Option<InlineCountKind>,
    pub format: Option<String>,
    pub skip_token: Option<String>,
    pub search: Option<String>,
    pub custom: Vec<QueryOptionToken>,
}

///
/// UriParser
///
/// Parses, normalizes and binds query text against a model. Holds no state
/// between calls beyond the model and settings.
///

#[derive(Clone, Debug)]
pub struct UriParser<'m> {
    model: &'m EdmModel,
    settings: UriSettings,
}

impl<'m> UriParser<'m> {
    #[must_use]
    pub const fn new(model: &'m EdmModel, settings: UriSettings) -> Self {
        Self { model, settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &UriSettings {
        &self.settings
    }

    const fn context(&self) -> BindContext<'m> {
        BindContext::new(self.model, ResolverPolicy::from_settings(&self.settings))
    }

    pub fn parse_path(&self, text: &str) -> Result<ODataPath, QueryError> {
        let leaf = parser::parse_resource_path(text, &self.settings)?;

        Ok(bind_path(self.context(), leaf)?)
    }

    pub fn parse_filter(
        &self,
        text: &str,
        entity: &Arc<EntityType>,
        source: Option<&NavigationSource>,
    ) -> Result<FilterClause, QueryError> {
        let token = parser::parse_filter(text, &self.settings)?;
        let mut binder = self.expression_binder(entity, source, self.settings.max_filter_depth);

        Ok(FilterClause::bind(&mut binder, &token)?)
    }

    pub fn parse_orderby(
        &self,
        text: &str,
        entity: &Arc<EntityType>,
        source: Option<&NavigationSource>,
    ) -> Result<OrderByClause, QueryError> {
        let tokens = parser::parse_orderby(text, &self.settings)?;
        let mut binder = self.expression_binder(entity, source, self.settings.max_orderby_depth);

        Ok(OrderByClause::bind(&mut binder, &tokens)?)
    }

    /// Bind `$select` and `$expand` text; either may be absent.
    pub fn parse_select_expand(
        &self,
        select: Option<&str>,
        expand: Option<&str>,
        entity: &Arc<EntityType>,
        source: Option<&NavigationSource>,
    ) -> Result<SelectExpandClause, QueryError> {
        let select = select
            .map(|text| parser::parse_select(text, &self.settings).map(normalize_select))
            .transpose()?;
        let expand = match expand {
            Some(text) => Some(normalize_expand(
                parser::parse_expand(text, &self.settings)?,
                &self.settings,
            )?),
            None => None,
        };

        Ok(bind_select_expand(
            self.context(),
            &self.settings,
            entity,
            source,
            select.as_ref(),
            expand.as_ref(),
        )?)
    }

    /// Parse and bind a service-root-relative URI.
    ///
    /// Expression options bind against the entities the path addresses.
    pub fn parse_uri(&self, uri: &str) -> Result<ParsedUri, QueryError> {
        let descriptor = parser::parse_query(uri, &self.settings)?;

        let path = descriptor
            .path
            .map(|leaf| bind_path(self.context(), leaf))
            .transpose()?;
        let target = path.as_ref().and_then(addressed_entity);
        let source = path.as_ref().and_then(ODataPath::navigation_source);

        let mut parsed = ParsedUri::default();
        let mut select = None;
        let mut expand = None;

        for option in descriptor.options {
            match option {
                QueryOptionClause::Filter(token) => {
                    let entity = require_target(target.as_ref(), path.as_ref(), "$filter")?;
                    let mut binder =
                        self.expression_binder(entity, source, self.settings.max_filter_depth);
                    parsed.filter = Some(FilterClause::bind(&mut binder, &token)?);
                }
                QueryOptionClause::OrderBy(tokens) => {
                    let entity = require_target(target.as_ref(), path.as_ref(), "$orderby")?;
                    let mut binder =
                        self.expression_binder(entity, source, self.settings.max_orderby_depth);
                    parsed.orderby = Some(OrderByClause::bind(&mut binder, &tokens)?);
                }
                QueryOptionClause::Select(token) => select = Some(normalize_select(token)),
                QueryOptionClause::Expand(token) => {
                    expand = Some(normalize_expand(token, &self.settings)?);
                }
                QueryOptionClause::Top(n) => parsed.top = Some(n),
                QueryOptionClause::Skip(n) => parsed.skip = Some(n),
                QueryOptionClause::Count(b) => parsed.count = Some(b),
                QueryOptionClause::InlineCount(kind) => parsed.inline_count = Some(kind),
                QueryOptionClause::Format(v) => parsed.format = Some(v),
                QueryOptionClause::SkipToken(v) => parsed.skip_token = Some(v),
                QueryOptionClause::Search(v) => parsed.search = Some(v),
                QueryOptionClause::Custom(custom) => parsed.custom.push(custom),
            }
        }

        if select.is_some() || expand.is_some() {
            let entity = require_target(target.as_ref(), path.as_ref(), "$select/$expand")?;
            parsed.select_expand = Some(bind_select_expand(
                self.context(),
                &self.settings,
                entity,
                source,
                select.as_ref(),
                expand.as_ref(),
            )?);
        }
        tracing::debug!(
            uri,
            filter = parsed.filter.is_some(),
            orderby = parsed.orderby.is_some(),
            select_expand = parsed.select_expand.is_some(),
            custom = parsed.custom.len(),
            "bound request uri"
        );
        parsed.path = path;

        Ok(parsed)
    }

    fn expression_binder(
        &self,
        entity: &Arc<EntityType>,
        source: Option<&NavigationSource>,
        limit: usize,
    ) -> ExpressionBinder<'m> {
        ExpressionBinder::for_entity(self.context(), entity, source.cloned(), limit)
    }
}

/// Entity type of the path's last typed segment, looking through
/// collections. `$count` and `$ref` keep the entities they follow.
fn addressed_entity(path: &ODataPath) -> Option<Arc<EntityType>> {
    if matches!(
        path.last(),
        Some(PathSegment::Value | PathSegment::Metadata | PathSegment::Batch)
    ) {
        return None;
    }

    let type_ref = path.target_type()?;
    let element = if type_ref.is_collection() {
        type_ref.as_collection().element_type().cloned()?
    } else {
        type_ref.clone()
    };

    element.structured_definition()?.as_entity().cloned()
}

fn require_target<'a>(
    target: Option<&'a Arc<EntityType>>,
    path: Option<&ODataPath>,
    option: &str,
) -> Result<&'a Arc<EntityType>, BindError> {
    target.ok_or_else(|| {
        BindError::invalid_segment(
            &path.map_or_else(String::new, ToString::to_string),
            &format!("{option} needs a path that addresses entities"),
        )
    })
}
