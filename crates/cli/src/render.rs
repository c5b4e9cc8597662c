//! Plain-text output.

use skillroute_core::{PhaseStatus, Profile};
use skillroute_progress::{ProgressReport, Recommendation};
use skillroute_session::{Notification, NotificationKind, RoadmapState};

pub fn profile(profile: Option<&Profile>) {
    let Some(p) = profile else {
        println!("No profile yet. Run `skillroute profile save`.");
        return;
    };
    println!("Profile: {}", p.name);
    println!("  Education: {}", p.education);
    println!("  Skills: {}", p.skills.join(", "));
    println!("  Interests: {}", p.interests.join(", "));
    println!("  Goals: {}", p.goals);
    if let Some(experience) = &p.experience {
        println!("  Experience: {}", experience);
    }
}

pub fn roadmap(state: &RoadmapState) {
    let Some(active) = state.active() else {
        println!("No roadmap yet. Run `skillroute roadmap generate`.");
        return;
    };
    if let Some(decision) = &active.career_decision {
        println!("Career: {} ({:.0}% confidence)", decision.career, decision.confidence());
        println!(
            "  Skill match: {:.0}% | Market readiness: {:.0}% | Demand: {:?}",
            decision.skill_match(),
            decision.market_readiness(),
            decision.industry_demand,
        );
    }
    println!(
        "Roadmap: {} months, {}/{} phases completed",
        active.learning_roadmap.duration_months,
        active.progress.completed_phases,
        active.progress.total_phases,
    );
    for (i, phase) in active.phases().iter().enumerate() {
        let mark = match phase.status {
            PhaseStatus::Completed => "x",
            PhaseStatus::Pending => " ",
        };
        println!("  [{}] {}. {} ({})", mark, i + 1, phase.label, phase.duration);
        if !phase.focus_skills.is_empty() {
            println!("        Focus: {}", phase.focus_skills.join(", "));
        }
    }
}

pub fn progress(report: &ProgressReport, recommendations: &[Recommendation]) {
    println!(
        "Progress: {}% ({}/{} phases)",
        report.percentage, report.completed_phases, report.total_phases
    );
    println!("  Streak: {} days", report.streak_days);
    println!("  Pace: {}", report.pace);
    if let Some(current) = report.current_phase {
        println!("  Current phase: {}", current + 1);
    }
    if report.is_complete() {
        println!("  Roadmap complete!");
    }
    if !recommendations.is_empty() {
        println!("Recommendations:");
        for r in recommendations {
            println!("  - {}: {}", r.title, r.message);
        }
    }
}

pub fn notifications(notifications: Vec<Notification>) {
    for n in notifications {
        let tag = match n.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        println!("[{}] {}", tag, n.message);
    }
}
