use std::{cell::RefCell, fmt::Display, rc::Rc};

use indexmap::IndexMap;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// One level of the scope chain.
///
/// Bindings keep their insertion order. Frames are shared through `Rc` so a
/// callee frame can point at the caller's frame while the caller still owns it.
#[derive(Debug)]
pub struct Frame<T> {
    bindings: RefCell<IndexMap<String, T>>,
    parent: Option<Rc<Frame<T>>>,
    depth: usize,
}

impl<T: Clone> Frame<T> {
    pub fn root() -> Rc<Self> {
        Rc::new(Frame {
            bindings: RefCell::new(IndexMap::new()),
            parent: None,
            depth: 0,
        })
    }

    pub fn child(parent: &Rc<Self>) -> Rc<Self> {
        Rc::new(Frame {
            bindings: RefCell::new(IndexMap::new()),
            parent: Some(Rc::clone(parent)),
            depth: parent.depth + 1,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<&Rc<Frame<T>>> {
        self.parent.as_ref()
    }

    /// Binds `name` in this frame, replacing a local binding of the same name.
    pub fn bind(&self, name: &str, value: T) {
        // A rebind keeps the slot where the name was first bound.
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// Binds every pair, in order.
    pub fn update<I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (String, T)>,
    {
        for (name, value) in pairs {
            self.bind(&name, value);
        }
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Looks `name` up here and then in every ancestor.
    pub fn get(&self, name: &str) -> Option<T> {
        let local = self.bindings.borrow().get(name).cloned();

        match local {
            Some(value) => Some(value),
            None => self.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    pub fn lookup(&self, name: &str, position: Position) -> Result<T, Error> {
        self.get(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: name.to_string(),
                },
                position,
            )
        })
    }

    /// Local names followed by the names of every ancestor.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self
            .bindings
            .borrow()
            .keys()
            .cloned()
            .collect::<Vec<String>>();
        if let Some(parent) = &self.parent {
            keys.extend(parent.keys());
        }
        keys
    }

    /// A snapshot of the local bindings.
    pub fn bindings(&self) -> Vec<(String, T)> {
        self.bindings
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<T: Display> Display for Frame<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bindings = self
            .bindings
            .borrow()
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<String>>();
        write!(f, "Frame(depth={}, {{{}}}", self.depth, bindings.join(", "))?;
        match &self.parent {
            Some(parent) => write!(f, ", parent={})", parent),
            None => write!(f, ", parent=None)"),
        }
    }
}
