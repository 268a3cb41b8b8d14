//! Provider Composition
//!
//! [`inject`] turns a list of providers and a terminal handler into a single
//! [`Handler`]. On invocation every provider is resolved against the calling
//! context, in declared order:
//!
//! - a provider failing synchronously stops the invocation immediately; later
//!   providers are not invoked
//! - when every provider settled synchronously, the terminal handler runs in
//!   the same turn and its outcome is returned as-is
//! - otherwise all provider values are awaited together and the first failure
//!   in declared order wins
//!
//! The first provider's value becomes the handler's `self`; the remaining
//! provider values followed by the call-site arguments become its arguments.

use crate::ports::injector::{Injected, Injector, Provided};
use crate::ports::symbols::Handler;
use futures::future::join_all;
use rsm_domain::error::Result;
use std::sync::Arc;

/// Resolver function of a provider
pub type ProviderFn = Arc<dyn Fn(&Arc<dyn Injector>) -> Provided + Send + Sync>;

/// A type that knows how to provide itself
///
/// Implemented by entity and service descriptors so they can be listed as
/// providers directly.
pub trait ConcreteType: Send + Sync {
    /// Resolver producing a value of this type from a context
    fn resolver(&self) -> ProviderFn;
}

/// Provider of one injected value
#[derive(Clone)]
pub enum Provider {
    /// Plain resolver function
    Direct(ProviderFn),
    /// Type that supplies its own resolver
    Wrapped(Arc<dyn ConcreteType>),
}

impl Provider {
    /// Provider from a resolver function
    pub fn direct<F>(resolve: F) -> Self
    where
        F: Fn(&Arc<dyn Injector>) -> Provided + Send + Sync + 'static,
    {
        Self::Direct(Arc::new(resolve))
    }

    /// Provider from a type that supplies its own resolver
    pub fn wrapped<T: ConcreteType + 'static>(concrete: T) -> Self {
        Self::Wrapped(Arc::new(concrete))
    }

    fn into_resolver(self) -> ProviderFn {
        match self {
            Self::Direct(resolve) => resolve,
            Self::Wrapped(concrete) => concrete.resolver(),
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Provider::Direct(..)"),
            Self::Wrapped(_) => f.write_str("Provider::Wrapped(..)"),
        }
    }
}

type Terminal = dyn Fn(Injected, Vec<Injected>) -> Provided + Send + Sync;

/// Handler whose `self` and leading arguments come from providers
#[derive(Clone)]
pub struct Injectable {
    resolvers: Vec<ProviderFn>,
    terminal: Arc<Terminal>,
}

/// Compose `providers` with a terminal `handler`
///
/// The handler receives the first provider's value as `self`
/// ([`Injected::Unit`] without providers) and the remaining provider values
/// followed by the call-site arguments.
pub fn inject<I, H>(providers: I, handler: H) -> Injectable
where
    I: IntoIterator<Item = Provider>,
    H: Fn(Injected, Vec<Injected>) -> Provided + Send + Sync + 'static,
{
    Injectable {
        resolvers: providers.into_iter().map(Provider::into_resolver).collect(),
        terminal: Arc::new(handler),
    }
}

impl Injectable {
    /// Resolve every provider against `ctx` and run the terminal handler
    pub fn invoke(&self, ctx: &Arc<dyn Injector>, args: Vec<Injected>) -> Provided {
        let mut outcomes = Vec::with_capacity(self.resolvers.len());
        for resolve in &self.resolvers {
            match resolve(ctx) {
                Provided::Ready(Err(err)) => return Provided::error(err),
                outcome => outcomes.push(outcome),
            }
        }

        if outcomes.iter().all(Provided::is_ready) {
            let values = outcomes
                .into_iter()
                .filter_map(Provided::now)
                .collect::<Result<Vec<_>>>();
            return match values {
                Ok(values) => apply(&self.terminal, values, args),
                Err(err) => Provided::error(err),
            };
        }

        let terminal = Arc::clone(&self.terminal);
        Provided::pending(async move {
            let values = join_all(outcomes.into_iter().map(Provided::settle))
                .await
                .into_iter()
                .collect::<Result<Vec<_>>>()?;
            apply(&terminal, values, args).settle().await
        })
    }
}

fn apply(terminal: &Arc<Terminal>, values: Vec<Injected>, args: Vec<Injected>) -> Provided {
    let mut values = values.into_iter();
    let this = values.next().unwrap_or(Injected::Unit);
    terminal(this, values.chain(args).collect())
}

impl Handler for Injectable {
    fn call(&self, ctx: Arc<dyn Injector>, args: Vec<Injected>) -> Provided {
        self.invoke(&ctx, args)
    }
}
