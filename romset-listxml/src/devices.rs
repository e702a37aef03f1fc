//! Transitive device-dependency resolution.

use std::collections::{HashMap, HashSet};

use crate::model::MachineRecord;

/// Resolves the transitive set of device machines reachable from a machine
/// via `device_ref` edges.
///
/// Each machine's closure is computed once and memoized. The traversal
/// marks in-progress machines so a cyclic reference chain yields the
/// partial set instead of recursing forever. Closure order is first-
/// discovery order, and the closure never contains the starting machine
/// itself. References to names absent from the catalog are ignored.
#[derive(Debug)]
pub struct DeviceResolver {
    refs: HashMap<String, Vec<String>>,
    memo: HashMap<String, Vec<String>>,
}

impl DeviceResolver {
    pub fn new(machines: &[MachineRecord]) -> Self {
        let refs = machines
            .iter()
            .map(|m| (m.name.clone(), m.device_refs.clone()))
            .collect();
        DeviceResolver {
            refs,
            memo: HashMap::new(),
        }
    }

    /// The device closure of `name`, exclusive of `name` itself.
    pub fn closure(&mut self, name: &str) -> Vec<String> {
        let mut in_progress = HashSet::new();
        self.resolve(name, &mut in_progress)
    }

    fn resolve(&mut self, name: &str, in_progress: &mut HashSet<String>) -> Vec<String> {
        if let Some(cached) = self.memo.get(name) {
            return cached.clone();
        }
        if !in_progress.insert(name.to_string()) {
            // Re-entry on a cycle.
            return Vec::new();
        }

        let mut out: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let direct = self.refs.get(name).cloned().unwrap_or_default();
        for dep in direct {
            if !self.refs.contains_key(&dep) {
                log::debug!("{name}: device_ref to unknown machine {dep}");
                continue;
            }
            if seen.insert(dep.clone()) {
                out.push(dep.clone());
            }
            for transitive in self.resolve(&dep, in_progress) {
                if seen.insert(transitive.clone()) {
                    out.push(transitive);
                }
            }
        }

        // A self-edge or cycle can feed the machine back into its own set.
        out.retain(|n| n != name);

        in_progress.remove(name);
        self.memo.insert(name.to_string(), out.clone());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(name: &str, device_refs: &[&str]) -> MachineRecord {
        MachineRecord {
            name: name.to_string(),
            device_refs: device_refs.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_direct_and_transitive_closure() {
        let machines = vec![
            machine("game", &["cpu"]),
            machine("cpu", &["pio"]),
            machine("pio", &[]),
        ];
        let mut resolver = DeviceResolver::new(&machines);
        assert_eq!(resolver.closure("game"), ["cpu", "pio"]);
        assert_eq!(resolver.closure("cpu"), ["pio"]);
        assert!(resolver.closure("pio").is_empty());
    }

    #[test]
    fn test_closure_excludes_self() {
        let machines = vec![machine("a", &["b"]), machine("b", &[])];
        let mut resolver = DeviceResolver::new(&machines);
        assert!(!resolver.closure("a").contains(&"a".to_string()));
    }

    #[test]
    fn test_diamond_is_deduplicated_in_discovery_order() {
        let machines = vec![
            machine("top", &["left", "right"]),
            machine("left", &["base"]),
            machine("right", &["base"]),
            machine("base", &[]),
        ];
        let mut resolver = DeviceResolver::new(&machines);
        assert_eq!(resolver.closure("top"), ["left", "base", "right"]);
    }

    #[test]
    fn test_cycle_does_not_recurse_forever() {
        let machines = vec![machine("a", &["b"]), machine("b", &["a"])];
        let mut resolver = DeviceResolver::new(&machines);
        let closure = resolver.closure("a");
        assert_eq!(closure, ["b"]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let machines = vec![machine("a", &["a", "b"]), machine("b", &[])];
        let mut resolver = DeviceResolver::new(&machines);
        assert_eq!(resolver.closure("a"), ["b"]);
    }

    #[test]
    fn test_unknown_reference_is_skipped() {
        let machines = vec![machine("a", &["ghost", "b"]), machine("b", &[])];
        let mut resolver = DeviceResolver::new(&machines);
        assert_eq!(resolver.closure("a"), ["b"]);
    }

    #[test]
    fn test_memoized_result_is_stable() {
        let machines = vec![
            machine("game", &["cpu"]),
            machine("cpu", &["pio"]),
            machine("pio", &[]),
        ];
        let mut resolver = DeviceResolver::new(&machines);
        let first = resolver.closure("game");
        let second = resolver.closure("game");
        assert_eq!(first, second);
    }
}
