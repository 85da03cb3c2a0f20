use crate::call::Call;
use crate::error::{MetavarsError, Result};
use crate::registry::{Function, FunctionValue, Registry};

/// Runs a parsed call against the registry.
///
/// ## Errors
///
/// Propagates [`MetavarsError::UnknownFunction`] from the lookup unchanged,
/// and any error the function itself returns.
#[tracing::instrument(level = "trace", skip_all, fields(name = call.name, arity = %call.arity()))]
pub fn evaluate(registry: &Registry, call: &Call<'_>) -> Result<FunctionValue> {
    let function = registry.lookup(call.name, call.arity())?;
    match (function, call.argument) {
        (Function::Nullary(f), None) => f(),
        (Function::Unary(f), Some(argument)) => f(argument),
        // Lookup is keyed by arity, so a mismatch here means no such entry.
        _ => Err(MetavarsError::UnknownFunction {
            name: call.name.to_string(),
            arity: call.arity(),
        }),
    }
}
