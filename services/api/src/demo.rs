use crate::infra::{sample_courses, sample_students, InMemoryAdmissionStore};
use admissions::error::AppError;
use admissions::workflows::admission::{
    write_admission_list_csv, write_merit_list_csv, AdmissionService, Course,
};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory to write merit-<code>.csv and admission-list.csv exports into
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryAdmissionStore::default());
    let service = AdmissionService::new(store);

    println!("Admission allocation demo");

    let mut students = Vec::new();
    for new_student in sample_students() {
        students.push(service.register_student(new_student)?);
    }
    let mut courses: Vec<Course> = Vec::new();
    for new_course in sample_courses() {
        courses.push(service.add_course(new_course)?);
    }

    // Every student applies to every course, first listed course preferred.
    for student in &students {
        for (index, course) in courses.iter().enumerate() {
            service.submit_application(student.id, course.id, index as u32 + 1)?;
        }
    }

    println!(
        "Seeded {} students, {} courses, {} applications",
        students.len(),
        courses.len(),
        students.len() * courses.len()
    );

    let cycle = service.run_admission_cycle()?;

    println!("\nAllocation passes");
    for pass in &cycle.passes {
        let course = service.get_course(pass.course_id)?;
        println!(
            "- {} ({}): {} approved, {} waitlisted, {} rejected, {} seat(s) left",
            course.name,
            course.code,
            pass.approved,
            pass.waitlisted,
            pass.rejected,
            pass.seats_remaining
        );
        for skipped in &pass.skipped {
            println!(
                "  skipped application {}: {}",
                skipped.application_id, skipped.reason
            );
        }
    }
    for failure in &cycle.failures {
        println!("- course {} failed: {}", failure.course_id, failure.error);
    }

    for course in &courses {
        println!("\nMerit list: {} ({})", course.name, course.code);
        let merit = service.merit_list(course.id)?;
        for entry in &merit {
            println!(
                "{:>3}. {} [{}] score {} -> {}",
                entry.rank, entry.student_name, entry.category, entry.merit_score, entry.status
            );
        }

        if let Some(dir) = &args.export_dir {
            let path = dir.join(format!("merit-{}.csv", course.code.to_ascii_lowercase()));
            let file = File::create(&path)?;
            write_merit_list_csv(file, course, &merit)?;
            println!("Merit list exported to: {}", path.display());
        }
    }

    let admission_list = service.admission_list()?;
    println!("\nAdmission list ({} admitted)", admission_list.len());
    for entry in &admission_list {
        println!(
            "- {} -> {} (score {})",
            entry.student_name, entry.course_name, entry.merit_score
        );
    }

    if let Some(dir) = &args.export_dir {
        let path = dir.join("admission-list.csv");
        let file = File::create(&path)?;
        write_admission_list_csv(file, &admission_list)?;
        println!("Admission list exported to: {}", path.display());
    }

    Ok(())
}
