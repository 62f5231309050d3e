//! Macros for context builder helpers

/// Generates `new`, `Default` and one `with_<field>` setter per field.
///
/// Every field names its default; the context must also carry an
/// `event_sender: Option<EventSender>` field.
#[macro_export]
macro_rules! context_builder {
    ($name:ident { $($field:ident: $ty:ty = $default:expr),* $(,)? }) => {
        paste::paste! {
            impl $name {
                /// Create a new context with default values
                #[must_use]
                pub fn new() -> Self {
                    Self {
                        $($field: $default,)*
                        event_sender: None,
                    }
                }

                $( #[must_use]
                pub fn [<with_ $field>](mut self, value: $ty) -> Self {
                    self.$field = value;
                    self
                } )*

                /// Set the event sender for progress reporting
                #[must_use]
                pub fn with_event_sender(mut self, sender: rgem_events::EventSender) -> Self {
                    self.event_sender = Some(sender);
                    self
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl rgem_events::EventEmitter for $name {
                fn event_sender(&self) -> Option<&rgem_events::EventSender> {
                    self.event_sender.as_ref()
                }
            }
        }
    };
}
