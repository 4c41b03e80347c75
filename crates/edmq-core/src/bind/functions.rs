use crate::{
    bind::{BindError, node::SingleValueNode},
    semantics::promotion_cost,
};
use edmq_primitives::PrimitiveKind;

///
/// FunctionSignature
///
/// One overload of a canonical function. Arguments promote to the
/// declared parameter kinds; the result is always nullable.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub parameters: &'static [PrimitiveKind],
    pub returns: PrimitiveKind,
}

impl FunctionSignature {
    const fn new(
        name: &'static str,
        parameters: &'static [PrimitiveKind],
        returns: PrimitiveKind,
    ) -> Self {
        Self {
            name,
            parameters,
            returns,
        }
    }

    #[must_use]
    pub const fn arity(&self) -> usize {
        self.parameters.len()
    }
}

use PrimitiveKind as K;

const S: &[K] = &[K::String];
const SS: &[K] = &[K::String, K::String];
const SSS: &[K] = &[K::String, K::String, K::String];
const SI: &[K] = &[K::String, K::Int32];
const SII: &[K] = &[K::String, K::Int32, K::Int32];
const DT: &[K] = &[K::DateTime];
const DTO: &[K] = &[K::DateTimeOffset];
const TM: &[K] = &[K::Time];
const DBL: &[K] = &[K::Double];
const DEC: &[K] = &[K::Decimal];

/// Canonical functions by name; `isof` and `cast` take a type name and
/// are bound separately.
pub const CANONICAL_FUNCTIONS: &[FunctionSignature] = &[
    FunctionSignature::new("substringof", SS, K::Boolean),
    FunctionSignature::new("startswith", SS, K::Boolean),
    FunctionSignature::new("endswith", SS, K::Boolean),
    FunctionSignature::new("length", S, K::Int32),
    FunctionSignature::new("indexof", SS, K::Int32),
    FunctionSignature::new("replace", SSS, K::String),
    FunctionSignature::new("substring", SI, K::String),
    FunctionSignature::new("substring", SII, K::String),
    FunctionSignature::new("tolower", S, K::String),
    FunctionSignature::new("toupper", S, K::String),
    FunctionSignature::new("trim", S, K::String),
    FunctionSignature::new("concat", SS, K::String),
    FunctionSignature::new("year", DT, K::Int32),
    FunctionSignature::new("year", DTO, K::Int32),
    FunctionSignature::new("month", DT, K::Int32),
    FunctionSignature::new("month", DTO, K::Int32),
    FunctionSignature::new("day", DT, K::Int32),
    FunctionSignature::new("day", DTO, K::Int32),
    FunctionSignature::new("hour", DT, K::Int32),
    FunctionSignature::new("hour", DTO, K::Int32),
    FunctionSignature::new("hour", TM, K::Int32),
    FunctionSignature::new("minute", DT, K::Int32),
    FunctionSignature::new("minute", DTO, K::Int32),
    FunctionSignature::new("minute", TM, K::Int32),
    FunctionSignature::new("second", DT, K::Int32),
    FunctionSignature::new("second", DTO, K::Int32),
    FunctionSignature::new("second", TM, K::Int32),
    FunctionSignature::new("round", DBL, K::Double),
    FunctionSignature::new("round", DEC, K::Decimal),
    FunctionSignature::new("floor", DBL, K::Double),
    FunctionSignature::new("floor", DEC, K::Decimal),
    FunctionSignature::new("ceiling", DBL, K::Double),
    FunctionSignature::new("ceiling", DEC, K::Decimal),
];

/// Type-name functions; bound by the expression binder, not the table.
pub(crate) const TYPE_FUNCTIONS: [&str; 2] = ["isof", "cast"];

pub(crate) fn is_canonical(name: &str) -> bool {
    TYPE_FUNCTIONS.contains(&name) || CANONICAL_FUNCTIONS.iter().any(|f| f.name == name)
}

/// Cheapest overload of `name` accepting `arguments`.
///
/// Untyped arguments (`null`, open properties) match any parameter at no
/// cost. Several overloads at the same lowest cost are ambiguous.
pub(crate) fn select_overload(
    name: &str,
    arguments: &[SingleValueNode],
) -> Result<&'static FunctionSignature, BindError> {
    let mut best: Option<(&'static FunctionSignature, usize)> = None;
    let mut tied = false;

    for signature in CANONICAL_FUNCTIONS
        .iter()
        .filter(|f| f.name == name && f.arity() == arguments.len())
    {
        let Some(cost) = call_cost(signature, arguments) else {
            continue;
        };

        match best {
            Some((_, best_cost)) if cost > best_cost => {}
            Some((_, best_cost)) if cost == best_cost => tied = true,
            _ => {
                best = Some((signature, cost));
                tied = false;
            }
        }
    }

    match best {
        Some(_) if tied => Err(BindError::AmbiguousOverload {
            name: name.to_string(),
        }),
        Some((signature, _)) => Ok(signature),
        None => Err(BindError::NoMatchingOverload {
            name: name.to_string(),
            arguments: describe_arguments(arguments),
        }),
    }
}

fn call_cost(signature: &FunctionSignature, arguments: &[SingleValueNode]) -> Option<usize> {
    signature
        .parameters
        .iter()
        .zip(arguments)
        .try_fold(0, |total, (parameter, argument)| {
            let Some(type_ref) = argument.type_ref() else {
                return Some(total);
            };

            let kind = type_ref.primitive_kind();
            if kind == *parameter || kind.promotes_to(*parameter) {
                Some(total + promotion_cost(kind, *parameter))
            } else {
                None
            }
        })
}

pub(crate) fn describe_arguments(arguments: &[SingleValueNode]) -> String {
    arguments
        .iter()
        .map(|argument| {
            argument
                .type_ref()
                .map_or_else(|| "null".to_string(), |t| t.full_name())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
