//! Starter document for new sessions. Content is written against
//! `ResumeData` with `${...}` placeholders so the preview fills itself from
//! the record.

use crate::blocks::{Block, BlockBody, BlockCollection, BlockError};

fn heading(id: &str, html: &str) -> Block {
    Block::with_id(id, BlockBody::Heading(html.to_string()))
}

fn paragraph(id: &str, parent: &str, html: &str) -> Block {
    Block::with_id(id, BlockBody::Paragraph(html.to_string())).child_of(parent)
}

fn two_column(id: &str, parent: &str, cols: [&str; 2]) -> Block {
    Block::with_id(id, BlockBody::TwoColumn(cols.map(str::to_string))).child_of(parent)
}

fn three_column(id: &str, parent: &str, cols: [&str; 3]) -> Block {
    Block::with_id(id, BlockBody::ThreeColumn(cols.map(str::to_string))).child_of(parent)
}

pub fn default_template() -> Result<BlockCollection, BlockError> {
    BlockCollection::new(vec![
        heading(
            "heading-personal",
            "<h1>${userInfo.firstName} ${userInfo.lastName}</h1>",
        ),
        paragraph("user-headline", "heading-personal", "<p>${userInfo.headLine}</p>"),
        paragraph(
            "user-email",
            "heading-personal",
            "<p>Email: ${userInfo.email}</p>",
        ),
        paragraph(
            "user-phone",
            "heading-personal",
            "<p>Phone: ${userInfo.phoneNumber}</p>",
        ),
        three_column(
            "user-profiles",
            "heading-personal",
            [
                "<p>${userInfo.location}</p>",
                "<p>${userInfo.linkedInURL}</p>",
                "<p>${userInfo.githubURL}</p>",
            ],
        ),
        heading("heading-education", "<h2>Education</h2>"),
        three_column(
            "education-0",
            "heading-education",
            [
                "<p><strong>${education[0].universityName}</strong></p>",
                "<p>${education[0].degree}, ${education[0].universityMajor}</p>",
                "<p>${education[0].fromDate} - ${education[0].toDate}</p>",
            ],
        ),
        paragraph(
            "education-0-detail",
            "heading-education",
            "<p>GPA: ${education[0].gpa} | Courses: ${education[0].courses}</p>",
        ),
        heading("heading-work", "<h2>Work Experience</h2>"),
        two_column(
            "work-0",
            "heading-work",
            [
                "<p><strong>${workExperience[0].companyName}</strong> | ${workExperience[0].jobTitle}</p>",
                "<p>${workExperience[0].city}, ${workExperience[0].country} | ${workExperience[0].fromDate} - ${workExperience[0].toDate}</p>",
            ],
        ),
        paragraph(
            "work-0-detail",
            "heading-work",
            "<p>${workExperience[0].description}</p>",
        ),
        heading("heading-projects", "<h2>Projects</h2>"),
        two_column(
            "project-0",
            "heading-projects",
            [
                "<p><strong>${projects[0].title}</strong></p>",
                "<p>${projects[0].fromDate} - ${projects[0].toDate}</p>",
            ],
        ),
        paragraph(
            "project-0-detail",
            "heading-projects",
            "<p>${projects[0].description}</p>",
        ),
        heading("heading-skills", "<h2>Skills</h2>"),
        paragraph("skills", "heading-skills", "<p>${skills}</p>"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::grouping::project;
    use crate::resume::ResumeData;
    use crate::template::resolve_blocks;

    #[test]
    fn test_default_template_is_valid() {
        let blocks = default_template().unwrap();
        let groups = project(blocks.blocks());
        let headings: Vec<&str> = groups.iter().map(|g| g.heading.id.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "heading-personal",
                "heading-education",
                "heading-work",
                "heading-projects",
                "heading-skills"
            ]
        );
        assert_eq!(groups[0].children.len(), 4);
    }

    #[test]
    fn test_default_template_resolves_against_sample() {
        let data = ResumeData::sample().to_value().unwrap();
        let resolved = resolve_blocks(default_template().unwrap().blocks(), &data);

        assert_eq!(
            resolved[0].body,
            BlockBody::Heading("<h1>Alex Chen</h1>".to_string())
        );
        let skills = resolved.iter().find(|b| b.id.as_str() == "skills").unwrap();
        assert_eq!(
            skills.body,
            BlockBody::Paragraph("<p>TypeScript,React,Rust,SQL</p>".to_string())
        );
        let work = resolved.iter().find(|b| b.id.as_str() == "work-0").unwrap();
        let BlockBody::TwoColumn([_, right]) = &work.body else {
            panic!("work-0 should stay two-column");
        };
        // ongoing role: empty end date
        assert!(right.ends_with("2023-01 - </p>"));
    }
}
