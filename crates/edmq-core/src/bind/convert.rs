use crate::{
    bind::{
        BindError, Resolver,
        node::{ConstantNode, ConvertNode, SingleValueNode},
    },
    edm::{EnumType, TypeRef},
    semantics::{are_related, can_promote},
    syntax::token::LiteralToken,
    value::{EnumValue, LiteralValue},
};

/// A literal as written, typed by its own value. Untyped for `null`
/// and for enum literals, which only get a type from their context.
#[must_use]
pub fn bind_literal(token: LiteralToken) -> ConstantNode {
    ConstantNode::new(token.value, token.text)
}

/// Convert `source` so it can be used where `target` is expected.
///
/// Returns `source` untouched when there is no target or the definitions
/// already agree. Enum targets re-interpret literals; primitive targets
/// only widen.
pub fn convert_to_type_if_needed(
    source: SingleValueNode,
    target: Option<&TypeRef>,
    resolver: &Resolver<'_>,
) -> Result<SingleValueNode, BindError> {
    let Some(target) = target else {
        return Ok(source);
    };
    if let Some(current) = source.type_ref()
        && current.is_definition_equivalent(target)
    {
        return Ok(source);
    }

    if source.is_null_constant() {
        return convert_null(source, target);
    }

    if let Some(enum_type) = target.as_enum().definition() {
        return convert_to_enum(source, enum_type, target, resolver);
    }

    let Some(current) = source.type_ref() else {
        // dynamic value of an open type; the type is only known at runtime
        return Ok(wrap(source, target));
    };

    if can_promote(current, target) {
        return Ok(wrap(source, target));
    }

    if let (Some(from), Some(to)) = (
        current.structured_definition(),
        target.structured_definition(),
    ) && are_related(&from, &to)
    {
        return Ok(source);
    }

    Err(cannot_convert(current.full_name(), target))
}

fn wrap(source: SingleValueNode, target: &TypeRef) -> SingleValueNode {
    SingleValueNode::Convert(ConvertNode {
        source: Box::new(source),
        type_ref: target.clone(),
    })
}

fn convert_null(source: SingleValueNode, target: &TypeRef) -> Result<SingleValueNode, BindError> {
    if target.is_nullable() {
        Ok(wrap(source, target))
    } else {
        Err(cannot_convert("null".to_string(), target))
    }
}

fn cannot_convert(from: String, target: &TypeRef) -> BindError {
    BindError::CannotConvertToType {
        from,
        to: target.full_name(),
    }
}

//
// enum conversion
//

fn convert_to_enum(
    source: SingleValueNode,
    enum_type: &EnumType,
    target: &TypeRef,
    resolver: &Resolver<'_>,
) -> Result<SingleValueNode, BindError> {
    let from = source
        .type_ref()
        .map_or_else(|| "null".to_string(), TypeRef::full_name);
    let SingleValueNode::Constant(constant) = source else {
        return Err(cannot_convert(from, target));
    };

    let member_text = match &constant.value {
        LiteralValue::Enum(value) => {
            check_enum_type_name(value, enum_type, target, resolver)?;
            enum_text(&value.text, enum_type, resolver)?
        }
        LiteralValue::String(text) if resolver.policy().unqualified_enum => {
            enum_text(text, enum_type, resolver)?
        }
        value => match value.as_i64() {
            Some(number) => enum_number(number, enum_type)?,
            None => return Err(cannot_convert(from, target)),
        },
    };

    let value = LiteralValue::Enum(EnumValue::new(enum_type.full_name(), member_text));
    Ok(SingleValueNode::Constant(ConstantNode::typed(
        value,
        constant.text,
        target.clone(),
    )))
}

fn check_enum_type_name(
    value: &EnumValue,
    enum_type: &EnumType,
    target: &TypeRef,
    resolver: &Resolver<'_>,
) -> Result<(), BindError> {
    let Some(name) = &value.type_name else {
        return Ok(());
    };
    let matches = if resolver.policy().case_insensitive {
        name.eq_ignore_ascii_case(enum_type.full_name())
    } else {
        name == enum_type.full_name()
    };

    if matches {
        Ok(())
    } else {
        Err(cannot_convert(name.clone(), target))
    }
}

/// Member name, flags list, or integer text, in that order.
fn enum_text(text: &str, enum_type: &EnumType, resolver: &Resolver<'_>) -> Result<String, BindError> {
    let trimmed = text.trim();

    if let Some(member) = resolver.enum_member(enum_type, trimmed)? {
        return Ok(member.name().to_string());
    }

    if trimmed.contains(',') {
        if !enum_type.is_flags() {
            return Err(invalid_constant(text, enum_type));
        }

        let mut names = Vec::new();
        for part in trimmed.split(',') {
            match resolver.enum_member(enum_type, part.trim())? {
                Some(member) => names.push(member.name()),
                None => return Err(invalid_constant(text, enum_type)),
            }
        }
        return Ok(names.join(","));
    }

    match trimmed.parse::<i64>() {
        Ok(number) => enum_number(number, enum_type),
        Err(_) => Err(invalid_constant(text, enum_type)),
    }
}

/// Integral value to member text. Flags values decompose into declared
/// members in declaration order; a leftover bit pattern keeps the raw
/// number.
fn enum_number(number: i64, enum_type: &EnumType) -> Result<String, BindError> {
    if let Some(member) = enum_type.find_member_by_value(number) {
        return Ok(member.name().to_string());
    }
    if !enum_type.is_flags() {
        return Err(invalid_constant(&number.to_string(), enum_type));
    }

    let mut remaining = number;
    let mut names = Vec::new();
    for member in enum_type.members() {
        let bits = member.value();
        if bits != 0 && number & bits == bits {
            names.push(member.name());
            remaining &= !bits;
        }
    }

    if remaining == 0 && !names.is_empty() {
        Ok(names.join(","))
    } else {
        Ok(number.to_string())
    }
}

fn invalid_constant(text: &str, enum_type: &EnumType) -> BindError {
    BindError::InvalidEnumConstant {
        value: text.to_string(),
        enum_type: enum_type.full_name().to_string(),
    }
}
