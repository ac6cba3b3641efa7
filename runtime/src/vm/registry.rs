use rustc_hash::FxHashMap;

/// A native function callable from the machine.
///
/// Callables are synchronous, take their arguments in source order, return
/// exactly one integer, and never reenter the machine.
pub type NativeFn = fn(&[i64]) -> i64;

/// A registered callable with its declared arity
#[derive(Clone, Copy, Debug)]
pub struct Callable {
    pub arity: usize,
    pub func: NativeFn,
}

/// Table of native callables, consulted by `Call` instructions.
///
/// The machine resolves names at execution time, so a program may be
/// lowered without its callables being registered yet.
#[derive(Clone, Default, Debug)]
pub struct Registry {
    entries: FxHashMap<String, Callable>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Create a registry pre-populated with the stock builtins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("print", 1, builtin_print);
        registry.register("abs", 1, builtin_abs);
        registry.register("min", 2, builtin_min);
        registry.register("max", 2, builtin_max);
        registry
    }

    /// Register a callable under `name`, replacing any previous entry
    pub fn register(&mut self, name: &str, arity: usize, func: NativeFn) {
        self.entries.insert(name.to_string(), Callable { arity, func });
    }

    /// Look up a callable by name
    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.entries.get(name)
    }
}

// Stock builtins. `print` is an identity function that also writes its
// argument to stdout, so a print call can sit inside a larger expression.

fn builtin_print(args: &[i64]) -> i64 {
    println!("{}", args[0]);
    args[0]
}

fn builtin_abs(args: &[i64]) -> i64 {
    args[0].wrapping_abs()
}

fn builtin_min(args: &[i64]) -> i64 {
    args[0].min(args[1])
}

fn builtin_max(args: &[i64]) -> i64 {
    args[0].max(args[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.get("print").is_none());
    }

    #[test]
    fn test_builtins_present() {
        let registry = Registry::with_builtins();
        for (name, arity) in [("print", 1), ("abs", 1), ("min", 2), ("max", 2)] {
            let callable = registry.get(name).unwrap();
            assert_eq!(callable.arity, arity, "arity of {}", name);
        }
        assert!(registry.get("frobnicate").is_none());
    }

    #[test]
    fn test_builtin_results() {
        let registry = Registry::with_builtins();
        assert_eq!((registry.get("abs").unwrap().func)(&[-9]), 9);
        assert_eq!((registry.get("min").unwrap().func)(&[3, -2]), -2);
        assert_eq!((registry.get("max").unwrap().func)(&[3, -2]), 3);
        assert_eq!((registry.get("print").unwrap().func)(&[7]), 7);
    }

    #[test]
    fn test_register_replaces() {
        fn zero(_args: &[i64]) -> i64 {
            0
        }

        let mut registry = Registry::with_builtins();
        registry.register("abs", 3, zero);
        let callable = registry.get("abs").unwrap();
        assert_eq!(callable.arity, 3);
        assert_eq!((callable.func)(&[1, 2, 3]), 0);
    }
}
