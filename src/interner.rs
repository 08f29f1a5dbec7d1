use std::cmp::Ordering;

use rustc_hash::FxHashMap;

/// Identity of an interned symbol name. Two symbols with the same spelling
/// always carry the same `SymId`, so name equality is an integer compare.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymId(pub u32);

/// Symbol name table: text -> id and back.
///
/// One interner lives inside each heap; there is no process-wide table, so
/// independent interpreter sessions never share state.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<String, SymId>, // text -> id
    rev: Vec<String>,              // id -> text
}

impl Interner {
    pub fn new() -> Self {
        Self { map: FxHashMap::default(), rev: Vec::new() }
    }

    pub fn intern(&mut self, s: &str) -> SymId {
        if let Some(&id) = self.map.get(s) {
            return id;
        }
        let id = SymId(self.rev.len() as u32);
        self.rev.push(s.to_owned());
        self.map.insert(self.rev[id.0 as usize].clone(), id);
        id
    }

    pub fn resolve(&self, id: SymId) -> &str {
        &self.rev[id.0 as usize]
    }

    /// Lexicographic order of the spellings behind two ids. Frames keep
    /// their bindings sorted by this order.
    pub fn cmp_names(&self, a: SymId, b: SymId) -> Ordering {
        if a == b {
            Ordering::Equal
        } else {
            self.resolve(a).cmp(self.resolve(b))
        }
    }
}
