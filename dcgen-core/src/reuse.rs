// Method reuse detection: decide whether a type already has (or will
// have) an equivalent copy operation, and what shape it returns.

use dcgen_model::{Model, TypeId};

/// A reusable copy operation found on a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reuse {
    pub result_is_pointer: bool,
}

/// Look for a copy operation on `ty`.
///
/// Members of the generating set count as already having one: their
/// method does not exist yet but will by the time the emitted unit is
/// compiled as a whole, so the result shape is the batch's configured
/// receiver shape.
///
/// Otherwise the method set is scanned for `method_name` with zero
/// parameters and one result that, modulo one pointer indirection on
/// each side, is identical to the receiver. Same-name methods with other
/// signatures are passed over. This is a naming-convention trust
/// boundary: a matching signature is assumed to perform a deep copy.
pub fn detect(
    model: &Model,
    ty: TypeId,
    generating: &[TypeId],
    method_name: &str,
    pointer_receiver: bool,
) -> Option<Reuse> {
    for &t in generating {
        if model.identical(ty, t) {
            return Some(Reuse {
                result_is_pointer: pointer_receiver,
            });
        }
    }

    for m in model.methods(ty) {
        if m.name != method_name {
            continue;
        }
        if m.param_count != 0 || m.results.len() != 1 {
            continue;
        }
        let (ret, ret_is_pointer) = model.reduce_pointer(m.results[0]);
        let (recv, _) = model.reduce_pointer(m.recv);
        if !model.identical(ret, recv) {
            continue;
        }
        return Some(Reuse {
            result_is_pointer: ret_is_pointer,
        });
    }

    None
}
