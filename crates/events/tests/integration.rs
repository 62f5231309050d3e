//! Integration tests for events

use rgem_events::*;
use std::path::PathBuf;

struct Reporter {
    tx: Option<EventSender>,
}

impl EventEmitter for Reporter {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }

    fn correlation_id(&self) -> Option<&str> {
        Some("rack-2.2.8")
    }
}

#[test]
fn test_event_sender_emits_in_order() {
    let (tx, mut rx) = channel();

    tx.emit_error("test error");
    tx.emit_debug("test debug");

    let first = rx.try_recv().unwrap();
    assert!(matches!(
        first.event,
        AppEvent::General(GeneralEvent::Error { .. })
    ));
    assert_eq!(first.meta.level, EventLevel::Error);

    let second = rx.try_recv().unwrap();
    assert!(matches!(
        second.event,
        AppEvent::General(GeneralEvent::DebugLog { .. })
    ));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_dropped_receiver() {
    let (tx, rx) = channel();
    drop(rx);

    // Should not panic when receiver is dropped
    tx.emit_warning("ignored");
}

#[test]
fn test_emitter_without_sender_is_silent() {
    let reporter = Reporter { tx: None };
    reporter.emit_notice("nobody listens");
}

#[test]
fn test_correlation_id_is_stamped() {
    let (tx, mut rx) = channel();
    let reporter = Reporter { tx: Some(tx) };

    reporter.emit(AppEvent::Install(InstallEvent::PostInstallMessage {
        package: "rack".to_string(),
        message: "thanks".to_string(),
    }));

    let message = rx.try_recv().unwrap();
    assert_eq!(message.meta.correlation_id.as_deref(), Some("rack-2.2.8"));
    assert_eq!(message.meta.source, EventSource::Install);
    log_event(&message);
}

#[test]
fn test_levels_follow_event_kind() {
    let failed = AppEvent::Build(BuildEvent::Failed {
        package: "puma".to_string(),
        descriptor: PathBuf::from("ext/puma_http11/extconf.rb"),
        log_path: PathBuf::from("/tmp/gem_make.out"),
        failure: FailureContext::new(Some("build.extension_failed"), "boom", None::<String>, false),
    });
    assert_eq!(failed.log_level(), tracing::Level::ERROR);
    assert_eq!(failed.log_target(), "rgem::events::build");

    let no_builder = AppEvent::Build(BuildEvent::NoBuilder {
        package: "odd".to_string(),
        descriptor: PathBuf::from("ext/build.sh"),
    });
    assert_eq!(no_builder.log_level(), tracing::Level::WARN);
}

#[test]
fn test_event_message_serializes_with_domain_tag() {
    let message = EventMessage::new(AppEvent::General(GeneralEvent::notice("hello")));
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["event"]["domain"], "general");
    assert_eq!(json["event"]["event"]["type"], "Notice");
    assert_eq!(json["meta"]["level"], "info");
    assert_eq!(json["meta"]["source"], "general");
}
