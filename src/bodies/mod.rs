mod rigid_body;
mod body_type;

pub use self::rigid_body::SimpleRigidBody;
pub use self::body_type::RigidBodyType;
pub use self::body_flags::BodyFlags;

/// Flags for controlling body behavior
pub mod body_flags {
    use bitflags::bitflags;

    #[cfg(feature = "serialize")]
    use serde::{Serialize, Deserialize};

    bitflags! {
        /// Flags for controlling the behavior of the reference chassis body
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
        pub struct BodyFlags: u32 {
            /// Body is moved by the caller and ignores impulses
            const KINEMATIC = 0x01;

            /// Body is affected by gravity during integration
            const AFFECTED_BY_GRAVITY = 0x02;

            /// Angular velocity is held at zero
            const LOCK_ROTATION = 0x04;
        }
    }
}
