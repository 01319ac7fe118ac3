use std::time::Duration;

use wamp_engine_values::{
    Dictionary,
    Integer,
    Value,
};

use crate::core::cancel::CallCancelMode;

fn set_flag(options: &mut Dictionary, key: &str, value: bool) {
    if value {
        options.insert(key.to_owned(), Value::Bool(true));
    }
}

/// Options for calling a procedure.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallOptions {
    /// The caller will accept progressive results.
    pub receive_progress: bool,
    /// The call should be canceled by the callee after this long.
    pub timeout: Option<Duration>,
    /// The caller's identity should be disclosed to the callee.
    pub disclose_me: bool,
    /// How the call is canceled if it is canceled.
    pub cancel_mode: CallCancelMode,
}

impl CallOptions {
    /// The options dictionary of the CALL message.
    pub fn to_options(&self) -> Dictionary {
        let mut options = Dictionary::default();
        set_flag(&mut options, "receive_progress", self.receive_progress);
        set_flag(&mut options, "disclose_me", self.disclose_me);
        if let Some(timeout) = self.timeout {
            options.insert(
                "timeout".to_owned(),
                Value::Integer(timeout.as_millis() as Integer),
            );
        }
        options
    }

    /// The options dictionary of the CANCEL message for this call.
    pub fn to_cancel_options(&self) -> Dictionary {
        Dictionary::from_iter([(
            "mode".to_owned(),
            Value::from(Into::<String>::into(self.cancel_mode)),
        )])
    }
}

/// Options for publishing an event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// The router should confirm the publication.
    pub acknowledge: bool,
    /// Should the publisher be excluded from receiving the event?
    pub exclude_me: bool,
    /// The publisher's identity should be disclosed to subscribers.
    pub disclose_me: bool,
}

impl PublishOptions {
    /// The options dictionary of the PUBLISH message.
    pub fn to_options(&self) -> Dictionary {
        let mut options = Dictionary::default();
        set_flag(&mut options, "acknowledge", self.acknowledge);
        set_flag(&mut options, "exclude_me", self.exclude_me);
        set_flag(&mut options, "disclose_me", self.disclose_me);
        options
    }
}

/// Options for registering a procedure.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcedureOptions {
    /// The caller's identity should be disclosed.
    pub disclose_caller: bool,
}

impl ProcedureOptions {
    /// The options dictionary of the REGISTER message.
    ///
    /// The match policy is carried by the procedure URI.
    pub fn to_options(&self) -> Dictionary {
        let mut options = Dictionary::default();
        set_flag(&mut options, "disclose_caller", self.disclose_caller);
        options
    }
}

#[cfg(test)]
mod options_test {
    use std::time::Duration;

    use wamp_engine_values::{
        Dictionary,
        Value,
    };

    use crate::{
        core::cancel::CallCancelMode,
        peer::options::{
            CallOptions,
            ProcedureOptions,
            PublishOptions,
        },
    };

    #[test]
    fn default_options_are_empty() {
        assert!(CallOptions::default().to_options().is_empty());
        assert!(PublishOptions::default().to_options().is_empty());
        assert!(ProcedureOptions::default().to_options().is_empty());
    }

    #[test]
    fn call_options_use_milliseconds() {
        let options = CallOptions {
            receive_progress: true,
            timeout: Some(Duration::from_secs_f64(2.5)),
            disclose_me: false,
            cancel_mode: CallCancelMode::Kill,
        };
        pretty_assertions::assert_eq!(
            options.to_options(),
            Dictionary::from_iter([
                ("receive_progress".to_owned(), Value::Bool(true)),
                ("timeout".to_owned(), Value::Integer(2500)),
            ])
        );
        assert_eq!(
            options.to_cancel_options().get("mode"),
            Some(&Value::from("kill"))
        );
    }

    #[test]
    fn publish_and_procedure_flags() {
        let options = PublishOptions {
            acknowledge: true,
            exclude_me: false,
            disclose_me: true,
        };
        assert_eq!(options.to_options().len(), 2);
        assert_eq!(
            ProcedureOptions {
                disclose_caller: true
            }
            .to_options()
            .get("disclose_caller"),
            Some(&Value::Bool(true))
        );
    }
}
