//! End-of-session report card: stats, letter grades and a shareable summary.

use std::fmt;

use serde::Serialize;

use crate::catalog::{IngredientId, ToolId};
use crate::escalation::{ChefAi, RuleView};
use crate::profile::PlayerProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    pub fn letter(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    pub fn points(self) -> f64 {
        match self {
            Grade::APlus => 4.3,
            Grade::A => 4.0,
            Grade::B => 3.0,
            Grade::C => 2.0,
            Grade::D => 1.0,
        }
    }

    /// Highest grade whose threshold `value` reaches, thresholds descending.
    fn at_least(value: f64, thresholds: [f64; 4]) -> Grade {
        const ORDER: [Grade; 4] = [Grade::APlus, Grade::A, Grade::B, Grade::C];
        ORDER
            .into_iter()
            .zip(thresholds)
            .find(|&(_, t)| value >= t)
            .map_or(Grade::D, |(grade, _)| grade)
    }

    /// Average remaining-time percentage.
    pub fn for_speed(percent: f64) -> Grade {
        Grade::at_least(percent, [70.0, 50.0, 35.0, 20.0])
    }

    pub fn for_accuracy(mistakes_per_order: f64) -> Grade {
        const ORDER: [(f64, Grade); 4] = [
            (0.5, Grade::APlus),
            (1.0, Grade::A),
            (2.0, Grade::B),
            (3.0, Grade::C),
        ];
        ORDER
            .into_iter()
            .find(|&(limit, _)| mistakes_per_order <= limit)
            .map_or(Grade::D, |(_, grade)| grade)
    }

    pub fn for_adaptability(score: u32) -> Grade {
        Grade::at_least(score as f64, [90.0, 75.0, 60.0, 45.0])
    }

    /// Graded on `100 - stress`.
    pub fn for_pressure(stress: u32) -> Grade {
        Grade::at_least(100.0 - stress as f64, [80.0, 65.0, 50.0, 35.0])
    }

    pub fn for_gpa(gpa: f64) -> Grade {
        Grade::at_least(gpa, [4.0, 3.5, 2.5, 1.5])
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grades {
    pub speed: Grade,
    pub accuracy: Grade,
    pub adaptability: Grade,
    pub pressure: Grade,
    pub overall: Grade,
    pub gpa: f64,
}

impl Grades {
    /// Lowest of the four category grades, first listed on ties.
    pub fn weakest(&self) -> (&'static str, Grade) {
        [
            ("speed", self.speed),
            ("accuracy", self.accuracy),
            ("adaptability", self.adaptability),
            ("pressure", self.pressure),
        ]
        .into_iter()
        .fold(("speed", self.speed), |weakest, next| {
            if next.1 < weakest.1 {
                next
            } else {
                weakest
            }
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageEntry {
    pub name: &'static str,
    pub uses: u32,
}

/// Written feedback used when no chat backend writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub assessment: String,
    pub strengths: String,
    pub weaknesses: String,
    pub improvement: String,
    pub chef_notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportCard {
    pub final_score: u32,
    pub orders_completed: u32,
    pub orders_target: u32,
    /// Percentage of the target reached.
    pub completion_rate: f64,

    pub perfect_orders: u32,
    pub fast_completions: u32,
    pub slow_completions: u32,
    pub timeouts: u32,

    /// Average remaining-time percentage.
    pub average_speed: f64,
    pub adaptability: u32,
    pub stress: u32,

    pub favorite_ingredients: Vec<UsageEntry>,
    pub total_ingredient_usage: u32,
    pub tool_usage: Vec<UsageEntry>,

    pub total_mistakes: usize,
    pub recent_mistakes: Vec<&'static str>,

    pub ingredients_banned: usize,
    pub tools_banned: usize,
    pub escalation_level: u32,

    pub grades: Grades,
}

impl ReportCard {
    pub fn build(score: u32, target_orders: u32, chef: &ChefAi, profile: &PlayerProfile) -> Self {
        let stats = chef.stats();
        let average_speed = profile.average_completion() * 100.0;
        let total_mistakes = profile.mistakes().len();
        let mistakes_per_order = total_mistakes as f64 / stats.orders_completed.max(1) as f64;

        let speed = Grade::for_speed(average_speed);
        let accuracy = Grade::for_accuracy(mistakes_per_order);
        let adaptability = Grade::for_adaptability(profile.adaptability());
        let pressure = Grade::for_pressure(profile.stress());
        let gpa = (speed.points() + accuracy.points() + adaptability.points() + pressure.points())
            / 4.0;

        let recent_start = total_mistakes.saturating_sub(5);
        Self {
            final_score: score,
            orders_completed: stats.orders_completed,
            orders_target: target_orders,
            completion_rate: if target_orders == 0 {
                0.0
            } else {
                stats.orders_completed as f64 / target_orders as f64 * 100.0
            },
            perfect_orders: stats.perfect_orders,
            fast_completions: stats.fast_completions,
            slow_completions: stats.slow_completions,
            timeouts: stats.timeouts,
            average_speed,
            adaptability: profile.adaptability(),
            stress: profile.stress(),
            favorite_ingredients: profile
                .top_ingredients(3)
                .into_iter()
                .map(|(id, uses)| UsageEntry {
                    name: IngredientId::name(id),
                    uses,
                })
                .collect(),
            total_ingredient_usage: profile.total_ingredient_uses(),
            tool_usage: profile
                .tool_uses()
                .iter()
                .map(|(&id, &uses)| UsageEntry {
                    name: ToolId::name(id),
                    uses,
                })
                .collect(),
            total_mistakes,
            recent_mistakes: profile.mistakes()[recent_start..]
                .iter()
                .map(|m| m.label())
                .collect(),
            ingredients_banned: chef.banned_ingredients().count(),
            tools_banned: chef.banned_tools().count(),
            escalation_level: chef.escalation_level(),
            grades: Grades {
                speed,
                accuracy,
                adaptability,
                pressure,
                overall: Grade::for_gpa(gpa),
                gpa,
            },
        }
    }

    /// Short text for sharing a result.
    pub fn share_text(&self) -> String {
        format!(
            "Chef's Chaos Kitchen Report Card\n\
             \n\
             Overall Grade: {} (GPA {:.2})\n\
             Score: {}\n\
             Orders: {}/{}\n\
             Perfect Orders: {}\n\
             \n\
             Grades:\n\
             Speed: {}\n\
             Accuracy: {}\n\
             Adaptability: {}\n\
             Pressure: {}\n\
             \n\
             Can YOU do better?",
            self.grades.overall,
            self.grades.gpa,
            self.final_score,
            self.orders_completed,
            self.orders_target,
            self.perfect_orders,
            self.grades.speed,
            self.grades.accuracy,
            self.grades.adaptability,
            self.grades.pressure,
        )
    }

    pub fn feedback(&self) -> Feedback {
        let grade = self.grades.overall;
        let good = grade >= Grade::A;
        let ok = grade == Grade::B;

        let assessment = if good {
            format!(
                "Outstanding work! You completed {} orders with a {} grade. Your adaptability and speed were impressive under pressure.",
                self.orders_completed, grade
            )
        } else if ok {
            format!(
                "Solid performance. You finished {} orders with a {} grade. You showed competence but there's room for improvement.",
                self.orders_completed, grade
            )
        } else {
            format!(
                "You struggled today. {} orders completed with a {} grade. The kitchen demands more focus and speed.",
                self.orders_completed, grade
            )
        };

        let strengths = if self.perfect_orders > 2 {
            format!(
                "Multiple perfect orders show attention to detail. {}",
                if self.fast_completions > 0 {
                    "Good speed on several orders."
                } else {
                    "Consistent accuracy."
                }
            )
        } else if self.fast_completions > 3 {
            "Excellent speed! You're quick on your feet. Adaptability to rule changes was decent."
                .to_string()
        } else {
            format!(
                "You persevered through {} escalation levels. That shows determination.",
                self.escalation_level
            )
        };

        let weaknesses = if self.timeouts > 2 {
            format!(
                "Too many timeouts ({}). Speed is critical. {} mistakes suggest rushing without thinking.",
                self.timeouts, self.total_mistakes
            )
        } else if self.total_mistakes > 5 {
            format!(
                "{} mistakes is too many. Focus on accuracy over speed. Read orders carefully.",
                self.total_mistakes
            )
        } else {
            format!(
                "Stress management needs work ({}/100). Stay calm under pressure.",
                self.stress
            )
        };

        let improvement = if self.grades.speed == Grade::D {
            "Work on speed: plan your route, minimize backtracking. Practice ingredient preparation. Keep moving."
        } else if self.grades.accuracy == Grade::D {
            "Focus on accuracy: double-check order requirements. Match ingredient states carefully. No rushing."
        } else {
            "Build adaptability: memorize station locations, practice with fewer ingredients. Stay flexible."
        };

        let chef_notes = if good {
            "You've got potential. Keep that fire burning. Now get back to work!"
        } else if ok {
            "Not bad, but I expect MORE next time. Practice makes perfect."
        } else {
            "This kitchen isn't for everyone. Come back when you're ready to COMMIT."
        };

        Feedback {
            assessment,
            strengths,
            weaknesses,
            improvement: improvement.to_string(),
            chef_notes: chef_notes.to_string(),
        }
    }
}

impl fmt::Display for ReportCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== REPORT CARD ===")?;
        writeln!(
            f,
            "Overall: {} (GPA {:.2})   Score: {}",
            self.grades.overall, self.grades.gpa, self.final_score
        )?;
        writeln!(
            f,
            "Orders: {}/{} ({:.1}%)",
            self.orders_completed, self.orders_target, self.completion_rate
        )?;
        writeln!(
            f,
            "Perfect {}  Fast {}  Slow {}  Timeouts {}",
            self.perfect_orders, self.fast_completions, self.slow_completions, self.timeouts
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Speed        {:<3} avg {:.1}% time left",
            self.grades.speed, self.average_speed
        )?;
        writeln!(
            f,
            "Accuracy     {:<3} {} mistakes",
            self.grades.accuracy, self.total_mistakes
        )?;
        writeln!(
            f,
            "Adaptability {:<3} {}/100",
            self.grades.adaptability, self.adaptability
        )?;
        writeln!(
            f,
            "Pressure     {:<3} stress {}/100",
            self.grades.pressure, self.stress
        )?;
        writeln!(f)?;

        let favorites: Vec<String> = self
            .favorite_ingredients
            .iter()
            .map(|u| format!("{} x{}", u.name, u.uses))
            .collect();
        writeln!(
            f,
            "Favourite ingredients: {} ({} total)",
            if favorites.is_empty() {
                "none".to_string()
            } else {
                favorites.join(", ")
            },
            self.total_ingredient_usage
        )?;
        let tools: Vec<String> = self
            .tool_usage
            .iter()
            .map(|u| format!("{} x{}", u.name, u.uses))
            .collect();
        writeln!(
            f,
            "Tools used: {}",
            if tools.is_empty() {
                "none".to_string()
            } else {
                tools.join(", ")
            }
        )?;
        writeln!(
            f,
            "Rules faced: {} ingredients banned, {} tools banned, escalation level {}",
            self.ingredients_banned, self.tools_banned, self.escalation_level
        )?;

        let feedback = self.feedback();
        writeln!(f)?;
        writeln!(f, "{}", feedback.assessment)?;
        writeln!(f, "Strengths: {}", feedback.strengths)?;
        writeln!(f, "Weaknesses: {}", feedback.weaknesses)?;
        writeln!(f, "Improve: {}", feedback.improvement)?;
        write!(f, "Chef: \"{}\"", feedback.chef_notes)
    }
}
