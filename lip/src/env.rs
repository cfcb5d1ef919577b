use crate::error::ErrorKind;
use crate::expr::LispExpr;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

struct Frame {
    syms: RefCell<HashMap<String, LispExpr>>,
    outer: Option<Rc<Frame>>,
}

/// A chain of scope frames, innermost first. Cloning an environment shares
/// its frames, so mutations through one handle are seen by all of them.
#[derive(Clone)]
pub struct Environment(Rc<Frame>);

impl Environment {
    pub fn new() -> Environment {
        Environment(Rc::new(Frame{syms: RefCell::new(HashMap::new()), outer: None}))
    }

    /// A new environment with one empty frame on top of this one.
    pub fn extend(&self) -> Environment {
        Environment(Rc::new(Frame{
            syms: RefCell::new(HashMap::new()),
            outer: Some(self.0.clone()),
        }))
    }

    fn lookup(&self, sym: &str) -> Option<&Frame> {
        let mut frame = Some(&self.0);
        while let Some(fr) = frame {
            if fr.syms.borrow().contains_key(sym) {
                return Some(fr.as_ref());
            }
            frame = fr.outer.as_ref();
        }
        None
    }

    pub fn get(&self, sym: &str) -> Option<LispExpr> {
        self.lookup(sym).and_then(|fr| fr.syms.borrow().get(sym).cloned())
    }

    /// Bind in the innermost frame only.
    pub fn define(&self, sym: &str, value: LispExpr) -> Result<(), ErrorKind> {
        let mut syms = self.0.syms.borrow_mut();
        if syms.contains_key(sym) {
            return Err(ErrorKind::AlreadyDefined(sym.to_string()));
        }
        syms.insert(sym.to_string(), value);
        Ok(())
    }

    /// Rebind in the nearest frame that holds `sym`.
    pub fn set(&self, sym: &str, value: LispExpr) -> Result<(), ErrorKind> {
        match self.lookup(sym) {
            Some(fr) => {
                fr.syms.borrow_mut().insert(sym.to_string(), value);
                Ok(())
            },
            None => Err(ErrorKind::Undefined(sym.to_string()))
        }
    }

    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = &self.0;
        while let Some(ref outer) = frame.outer {
            depth += 1;
            frame = outer;
        }
        depth
    }

    /// Names bound in the innermost frame, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.0.syms.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Environment {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Environment(depth={})", self.depth())
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Environment;
    use crate::error::ErrorKind;
    use crate::expr::LispExpr;

    #[test]
    fn define_is_frame_local() {
        let env = Environment::new();
        env.define("x", LispExpr::int(1)).unwrap();
        assert_eq!(env.define("x", LispExpr::int(2)),
                   Err(ErrorKind::AlreadyDefined(format!("x"))));
        let inner = env.extend();
        inner.define("x", LispExpr::int(3)).unwrap();
        assert_eq!(inner.get("x"), Some(LispExpr::int(3)));
        assert_eq!(env.get("x"), Some(LispExpr::int(1)));
    }

    #[test]
    fn set_mutates_nearest_binding() {
        let env = Environment::new();
        env.define("x", LispExpr::int(1)).unwrap();
        let inner = env.extend();
        inner.set("x", LispExpr::int(5)).unwrap();
        assert_eq!(env.get("x"), Some(LispExpr::int(5)));
        assert_eq!(inner.set("y", LispExpr::nil()),
                   Err(ErrorKind::Undefined(format!("y"))));
    }

    #[test]
    fn extend_leaves_parent_alone() {
        let env = Environment::new();
        let a = env.extend();
        let b = env.extend();
        a.define("only_a", LispExpr::nil()).unwrap();
        assert_eq!(b.get("only_a"), None);
        assert_eq!(env.get("only_a"), None);
        assert_eq!(a.depth(), 2);
        assert_eq!(env.depth(), 1);
        // frames are shared, later definitions in the parent are visible
        env.define("late", LispExpr::int(7)).unwrap();
        assert_eq!(a.get("late"), Some(LispExpr::int(7)));
    }
}
