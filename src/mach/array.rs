use super::Object;
use crate::error;
use crate::lang::{Error, Suffix};
use std::cell::RefCell;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Slots per dimension of an array that was used without `DIM`.
pub const DEFAULT_SLOTS: usize = 11;

/// ## Array memory
///
/// Multi-dimensional arrays nest: every slot of an outer dimension holds
/// another `Object::Array`. Leaves hold values of the element suffix.

#[derive(Debug)]
pub struct Array {
    suffix: Suffix,
    slots: Vec<Option<Object>>,
}

impl Array {
    /// Allocates `n` slots for each entry of `sizes`, every leaf set to
    /// the zero value of `suffix`.
    pub fn dimension(suffix: Suffix, sizes: &[usize]) -> Rc<RefCell<Array>> {
        let slots = match sizes.split_first() {
            Some((&len, rest)) if !rest.is_empty() => (0..len)
                .map(|_| Some(Object::Array(Array::dimension(suffix, rest))))
                .collect(),
            Some((&len, _)) => (0..len).map(|_| Some(Object::zero(suffix))).collect(),
            None => vec![],
        };
        Rc::new(RefCell::new(Array { suffix, slots }))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn suffix(&self) -> Suffix {
        self.suffix
    }

    fn slot(&self, index: i64) -> Result<&Object> {
        if index < 0 {
            return Err(error!(SubscriptOutOfRange));
        }
        match self.slots.get(index as usize) {
            Some(Some(obj)) => Ok(obj),
            _ => Err(error!(SubscriptOutOfRange)),
        }
    }

    pub fn fetch(&self, indices: &[i64]) -> Result<Object> {
        let (&index, rest) = match indices.split_first() {
            Some(split) => split,
            None => return Err(error!(SubscriptOutOfRange)),
        };
        match (self.slot(index)?, rest.is_empty()) {
            (Object::Array(inner), false) => {
                let obj = inner.borrow().fetch(rest)?;
                Ok(obj)
            }
            (Object::Array(_), true) | (_, false) => Err(error!(SubscriptOutOfRange)),
            (obj, true) => Ok(obj.clone()),
        }
    }

    /// Only the innermost dimension replaces a value; outer dimensions
    /// hand the remaining subscripts down.
    pub fn store(&mut self, indices: &[i64], value: Object) -> Result<()> {
        let (&index, rest) = match indices.split_first() {
            Some(split) => split,
            None => return Err(error!(SubscriptOutOfRange)),
        };
        let inner = match (self.slot(index)?, rest.is_empty()) {
            (Object::Array(inner), false) => Some(inner.clone()),
            (Object::Array(_), true) | (_, false) => return Err(error!(SubscriptOutOfRange)),
            (existing, true) if !existing.is_compatible(&value) => {
                return Err(error!(TypeMismatch))
            }
            (_, true) => None,
        };
        match inner {
            Some(inner) => {
                inner.borrow_mut().store(rest, value)?;
                Ok(())
            }
            None => {
                self.slots[index as usize] = Some(value.coerce(self.suffix)?);
                Ok(())
            }
        }
    }
}
