//! Method body flags and descriptor types for decoded CIL methods.
//!
//! This module defines the header flag words of ECMA-335 §II.25.4 together with the small
//! descriptor values that attach externally resolved types to local-variable slots and
//! parameter positions.
//!
//! # Key Types
//! - [`MethodBodyFlags`]: Tiny/fat format selectors and fat header flags
//! - [`LocalVariable`]: A resolved type bound to a local slot
//! - [`Parameter`]: A resolved type bound to a parameter position

use bitflags::bitflags;

use crate::metadata::typesystem::CilTypeHandle;

bitflags! {
    #[derive(PartialEq)]
    /// Flags that a method body can have
    pub struct MethodBodyFlags: u16 {
        /// Tiny method header format
        const TINY_FORMAT = 0x2;
        /// Fat method header format
        const FAT_FORMAT = 0x3;
        /// Flag of the fat method header, showing that there are more data sections appended to the header
        const MORE_SECTS = 0x8;
        /// Flag to indicate that this method should call the default constructor on all local variables
        const INIT_LOCALS = 0x10;
    }
}

/// One declared local variable of a method body.
///
/// The type handle comes from the external resolution of the header's local-variable
/// signature token; the slot index is the variable's position in that signature. Slots are
/// unique and contiguous from 0 within one method body, matching the indices `ldloc`/`stloc`
/// operands refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariable {
    /// The resolved type stored in this slot
    pub ty: CilTypeHandle,
    /// Zero-based slot index within the method body
    pub slot: u16,
}

/// One formal parameter of a method.
///
/// Parameter descriptors are supplied by the external method-signature reader, never derived
/// from the code stream. The implicit `this` argument of instance methods is not part of this
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    /// The resolved type of the parameter
    pub ty: CilTypeHandle,
    /// Zero-based position within the formal parameter list
    pub position: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bits() {
        assert_eq!(
            MethodBodyFlags::from_bits_truncate(0b10),
            MethodBodyFlags::TINY_FORMAT
        );
        assert_eq!(
            MethodBodyFlags::from_bits_truncate(0b11),
            MethodBodyFlags::FAT_FORMAT
        );
    }

    #[test]
    fn fat_flag_word() {
        let flags = MethodBodyFlags::from_bits_truncate(0x13);
        assert!(flags.contains(MethodBodyFlags::FAT_FORMAT));
        assert!(flags.contains(MethodBodyFlags::INIT_LOCALS));
        assert!(!flags.contains(MethodBodyFlags::MORE_SECTS));
    }

    #[test]
    fn descriptors_are_plain_values() {
        let local = LocalVariable {
            ty: CilTypeHandle::new(3),
            slot: 0,
        };
        let copy = local;
        assert_eq!(local, copy);

        let param = Parameter {
            ty: CilTypeHandle::new(3),
            position: 1,
        };
        assert_eq!(param.position, 1);
        assert_eq!(param.ty, local.ty);
    }
}
