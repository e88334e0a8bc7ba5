//! Plain-text rendering of an action bar.

use affordance_core::{Affordance, Descriptor};

/// One line per control; stack rows are indented under their summary.
pub fn render_bar(affordances: &[Affordance]) -> Vec<String> {
    let mut lines = Vec::new();
    for affordance in affordances {
        match affordance {
            Affordance::Action(descriptor) => lines.push(render_descriptor(descriptor)),
            Affordance::Stack(stack) => {
                lines.push(render_descriptor(&stack.summary));
                for item in &stack.items {
                    lines.push(format!("    {}", render_descriptor(item)));
                }
            }
        }
    }
    lines
}

pub fn render_descriptor(descriptor: &Descriptor) -> String {
    let mut line = format!("[{:<15}] {}", descriptor.status, descriptor.label);
    if let Some(addendum) = &descriptor.label_addendum {
        line.push_str(&format!(" ({addendum})"));
    }
    let flags = &descriptor.flags;
    if let Some(badge) = flags.badge {
        line.push_str(&format!(" #{badge}"));
    }
    if let Some(finish_time) = flags.finish_time {
        line.push_str(&format!(" until {finish_time}"));
    }
    if flags.attention {
        line.push_str(" !");
    }
    if flags.loading {
        line.push_str(" ...");
    }
    if let Some(reason) = descriptor.disabled_reason {
        line.push_str(&format!(" | {}", reason.text()));
    }
    if let Some(at) = descriptor.scheduled_for {
        line.push_str(&format!(" | queued for {at}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use affordance_core::test_fixtures::{base_rules, base_snapshot, primary};
    use affordance_core::ActionKind;

    #[test]
    fn disabled_control_shows_its_reason() {
        let mut snapshot = base_snapshot();
        snapshot.samples.clear();
        let extract = primary(&snapshot, &base_rules(), ActionKind::Extract).unwrap();
        let line = render_descriptor(&extract);
        assert!(line.starts_with("[ready          ] Extract"), "{line}");
        assert!(line.ends_with(&format!(" | {}", extract.disabled_reason.unwrap().text())));
    }

    #[test]
    fn queued_control_shows_its_start() {
        let mut snapshot = base_snapshot();
        snapshot.crew.as_mut().unwrap().ready_at = 10_500;
        let extract = primary(&snapshot, &base_rules(), ActionKind::Extract).unwrap();
        assert!(render_descriptor(&extract).ends_with(" | queued for 10500"));
    }
}
