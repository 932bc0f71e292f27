// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`] — stable `as_str()` name plus a `Display` impl
//! - [`setters!`] — setter methods for builder/config/options structs

/// Generate a stable string name for each enum variant: an inherent
/// `as_str()` returning `&'static str`, plus a `Display` impl delegating to
/// it.
///
/// The names double as log-field values and wire tags, so they must never
/// change once shipped. Unit variants match directly; data-carrying variants
/// use `(..)` to ignore fields.
///
/// ```ignore
/// wl_core::simple_display! {
///     MachineState {
///         Created => "created",
///         DecisionSent => "decision_sent",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl $enum {
            /// Stable variant name, used in logs and wire tags.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                }
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Generate setter methods inside an existing `impl` block.
///
/// Field groups:
/// - `into { field: Type }` — setter uses `impl Into<Type>`
/// - `set { field: Type }` — setter takes `Type` directly
/// - `option { field: Type }` — target field is `Option<Type>`, setter wraps
///   the value in `Some(v.into())`
/// - `flag { field }` — target field is `bool`, setter takes no argument and
///   sets it (for opt-in switches like disabling sticky execution)
///
/// ```ignore
/// impl WorkerConfigBuilder {
///     wl_core::setters! {
///         into { task_list: String }
///         set { workflow_pollers: usize }
///         option { activity_tasks_per_second: f64 }
///         flag { disable_sticky }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(into {
            $( $into_field:ident : $into_ty:ty ),* $(,)?
        })?
        $(set {
            $( $set_field:ident : $set_ty:ty ),* $(,)?
        })?
        $(option {
            $( $opt_field:ident : $opt_ty:ty ),* $(,)?
        })?
        $(flag {
            $( $flag_field:ident ),* $(,)?
        })?
    ) => {
        $($(
            pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                self.$into_field = v.into();
                self
            }
        )*)?

        $($(
            pub fn $set_field(mut self, v: $set_ty) -> Self {
                self.$set_field = v;
                self
            }
        )*)?

        $($(
            pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                self.$opt_field = Some(v.into());
                self
            }
        )*)?

        $($(
            pub fn $flag_field(mut self) -> Self {
                self.$flag_field = true;
                self
            }
        )*)?
    };
}
