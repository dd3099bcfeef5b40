/*!
 * Tests for forced subtitle classification
 */

use std::collections::BTreeMap;
use std::fs;
use anyhow::Result;
use mediatidy::file_utils::FileManager;
use mediatidy::language_utils::{LanguageTable, SurfaceForm};
use mediatidy::subtitle_classifier::{
    classify_forced, ForcedVerdict, GroupOutcome, SubtitleClassifier, SubtitleRole,
};
use crate::common;

#[test]
fn test_classify_forced_withSizeBoundaries_shouldPickExpectedBranch() {
    // not smaller than the original -> duplicate
    assert_eq!(classify_forced(1000, 1000, 40), ForcedVerdict::Duplicate);
    assert_eq!(classify_forced(1000, 1200, 40), ForcedVerdict::Duplicate);

    // just below the original, far above 40% -> ambiguous
    assert_eq!(classify_forced(1000, 999, 40), ForcedVerdict::Ambiguous);
    assert_eq!(classify_forced(1000, 401, 40), ForcedVerdict::Ambiguous);

    // exactly 40% is still forced
    assert_eq!(classify_forced(1000, 400, 40), ForcedVerdict::Forced);
    assert_eq!(classify_forced(1000, 300, 40), ForcedVerdict::Forced);
    assert_eq!(classify_forced(1000, 0, 40), ForcedVerdict::Forced);
}

#[test]
fn test_classify_forced_withEmptyOriginal_shouldTreatAnyCandidateAsDuplicate() {
    assert_eq!(classify_forced(0, 0, 40), ForcedVerdict::Duplicate);
    assert_eq!(classify_forced(0, 10, 40), ForcedVerdict::Duplicate);
}

#[test]
fn test_classify_forced_withCustomPercent_shouldMoveBoundary() {
    assert_eq!(classify_forced(1000, 450, 50), ForcedVerdict::Forced);
    assert_eq!(classify_forced(1000, 450, 40), ForcedVerdict::Ambiguous);
}

#[test]
fn test_classify_forced_withHugeSizes_shouldNotOverflow() {
    assert_eq!(classify_forced(u64::MAX, u64::MAX / 2, 40), ForcedVerdict::Ambiguous);
    assert_eq!(classify_forced(u64::MAX, u64::MAX / 4, 40), ForcedVerdict::Forced);
}

#[test]
fn test_run_withSmallSibling_shouldRenameBothToCanonicalNames() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Movie/Movie.1.en.srt", 1000)?;
    common::create_sized_file(root, "Movie/Movie.2.en.srt", 300)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert!(report.failures.is_empty());
    assert_eq!(report.outcomes.len(), 1);
    match &report.outcomes[0] {
        GroupOutcome::ForcedRenamed { original, forced } => {
            assert_eq!(original.path, root.join("Movie/Movie.eng.srt"));
            assert_eq!(original.role, SubtitleRole::Original);
            assert_eq!(forced.path, root.join("Movie/Movie.eng.forced.srt"));
            assert_eq!(forced.role, SubtitleRole::Forced);
            assert_eq!(forced.size_bytes, 300);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        common::snapshot(root),
        common::paths(&["Movie", "Movie/Movie.eng.srt", "Movie/Movie.eng.forced.srt"])
    );

    Ok(())
}

#[test]
fn test_run_withExactlyFortyPercent_shouldClassifyAsForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Movie.1.en.srt", 1000)?;
    common::create_sized_file(root, "Movie.2.en.srt", 400)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert!(matches!(report.outcomes[0], GroupOutcome::ForcedRenamed { .. }));
    assert!(root.join("Movie.eng.forced.srt").exists());

    Ok(())
}

#[test]
fn test_run_withAmbiguousSibling_shouldLeaveItUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Movie.1.en.srt", 1000)?;
    let sibling = common::create_sized_file(root, "Movie.2.en.srt", 401)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    match &report.outcomes[0] {
        GroupOutcome::NeedsReview { candidate, .. } => {
            assert_eq!(candidate.path, sibling);
            assert_eq!(candidate.role, SubtitleRole::Unclassified);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(common::snapshot(root), common::paths(&["Movie.eng.srt", "Movie.2.en.srt"]));
    assert_eq!(fs::metadata(&sibling)?.len(), 401);

    Ok(())
}

#[test]
fn test_run_withSameSizeSibling_shouldDeleteDuplicate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Movie.1.en.srt", 1000)?;
    let sibling = common::create_sized_file(root, "Movie.2.en.srt", 1000)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert_eq!(
        report.outcomes[0],
        GroupOutcome::DuplicateRemoved {
            original: report.outcomes[0].original().clone(),
            removed: sibling.clone(),
        }
    );
    assert!(!sibling.exists());
    assert_eq!(common::snapshot(root), common::paths(&["Movie.eng.srt"]));

    Ok(())
}

#[test]
fn test_run_withoutSibling_shouldOnlyRenameOriginal() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Show/S01/Show.S01E01.1.en.srt", 800)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert!(report.failures.is_empty());
    match &report.outcomes[0] {
        GroupOutcome::OriginalOnly { original } => {
            assert_eq!(original.path, root.join("Show/S01/Show.S01E01.eng.srt"));
            assert_eq!(original.size_bytes, 800);
            assert_eq!(original.surface_form, SurfaceForm::Long);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    Ok(())
}

#[test]
fn test_run_withLongSurfaceForm_shouldDiscoverAndCanonicalize() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Movie.1.eng.srt", 1000)?;
    common::create_sized_file(root, "Movie.2.eng.srt", 100)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(common::snapshot(root), common::paths(&["Movie.eng.srt", "Movie.eng.forced.srt"]));

    Ok(())
}

#[test]
fn test_run_withSiblingInOtherSurfaceForm_shouldStillPairThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Movie.1.en.srt", 1000)?;
    common::create_sized_file(root, "Movie.2.eng.srt", 200)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    match &report.outcomes[0] {
        GroupOutcome::ForcedRenamed { forced, .. } => {
            assert_eq!(forced.path, root.join("Movie.eng.forced.srt"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    Ok(())
}

#[test]
fn test_run_withVariantOneInBothSurfaceForms_shouldLetLongFormWin() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "M.1.en.srt", 1000)?;
    common::create_sized_file(root, "M.1.eng.srt", 900)?;
    common::create_sized_file(root, "M.2.en.srt", 100)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let classifier = SubtitleClassifier::new(&languages, &files);

    let order: Vec<_> = classifier.discover(root)?.into_iter().map(|g| g.surface_form).collect();
    assert_eq!(order, vec![SurfaceForm::Short, SurfaceForm::Long]);

    let report = classifier.run(root)?;

    // the 2-letter group claims the sibling, the 3-letter group then replaces its original
    assert!(matches!(report.outcomes[0], GroupOutcome::ForcedRenamed { .. }));
    assert!(matches!(report.outcomes[1], GroupOutcome::OriginalOnly { .. }));
    assert_eq!(common::snapshot(root), common::paths(&["M.eng.srt", "M.eng.forced.srt"]));
    assert_eq!(fs::metadata(root.join("M.eng.srt"))?.len(), 900);
    assert_eq!(fs::metadata(root.join("M.eng.forced.srt"))?.len(), 100);

    Ok(())
}

#[test]
fn test_run_withUnrecognizedLanguage_shouldIgnoreFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Film.1.de.srt", 1000)?;
    common::create_sized_file(root, "Film.2.de.srt", 100)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert!(report.outcomes.is_empty());
    assert_eq!(common::snapshot(root), common::paths(&["Film.1.de.srt", "Film.2.de.srt"]));

    Ok(())
}

#[test]
fn test_run_withConfiguredSecondLanguage_shouldHandleEachTagIndependently() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Film.1.en.srt", 1000)?;
    common::create_sized_file(root, "Film.1.de.srt", 1000)?;
    common::create_sized_file(root, "Film.2.de.srt", 100)?;

    let pairs = BTreeMap::from([
        ("en".to_string(), "eng".to_string()),
        ("de".to_string(), "ger".to_string()),
    ]);
    let languages = LanguageTable::from_pairs(&pairs)?;
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(
        common::snapshot(root),
        common::paths(&["Film.eng.srt", "Film.ger.srt", "Film.ger.forced.srt"])
    );

    Ok(())
}

#[test]
fn test_run_twice_shouldDiscoverNothingTheSecondTime() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "A/A.1.en.srt", 1000)?;
    common::create_sized_file(root, "A/A.2.en.srt", 100)?;
    common::create_sized_file(root, "B/B.1.en.srt", 1000)?;
    common::create_sized_file(root, "B/B.2.en.srt", 700)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let classifier = SubtitleClassifier::new(&languages, &files);
    assert_eq!(classifier.run(root)?.outcomes.len(), 2);

    let after_first = common::snapshot(root);
    assert!(classifier.discover(root)?.is_empty());
    let second = classifier.run(root)?;
    assert!(second.outcomes.is_empty());
    assert_eq!(common::snapshot(root), after_first);

    Ok(())
}

#[test]
fn test_process_group_withVanishedOriginal_shouldFailOnlyThatGroup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let doomed = common::create_sized_file(root, "A/A.1.en.srt", 1000)?;
    common::create_sized_file(root, "B/B.1.en.srt", 1000)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let classifier = SubtitleClassifier::new(&languages, &files);
    let mut groups = classifier.discover(root)?;
    assert_eq!(groups.len(), 2);

    // simulate another process removing the file between discovery and renaming
    fs::remove_file(&doomed)?;

    let results: Vec<_> = groups.iter_mut().map(|g| classifier.process_group(g)).collect();
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(root.join("B/B.eng.srt").exists());

    Ok(())
}

#[test]
fn test_run_withReviewLog_shouldRecordAmbiguousFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("library");
    common::create_sized_file(&root, "Movie.1.en.srt", 1000)?;
    common::create_sized_file(&root, "Movie.2.en.srt", 600)?;
    let review_log = temp_dir.path().join("logs/review.log");

    let languages = LanguageTable::default();
    let files = FileManager::new();
    SubtitleClassifier::new(&languages, &files)
        .with_review_log(Some(review_log.as_path()))
        .run(&root)?;

    let logged = fs::read_to_string(&review_log)?;
    assert!(logged.contains("Movie.2.en.srt"));
    assert!(logged.contains("600 of 1000 bytes"));

    Ok(())
}

#[test]
fn test_run_withDryRun_shouldReportWithoutTouchingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "Movie.1.en.srt", 1000)?;
    common::create_sized_file(root, "Movie.2.en.srt", 100)?;
    let before = common::snapshot(root);

    let languages = LanguageTable::default();
    let files = FileManager::dry_run();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?;

    assert!(matches!(report.outcomes[0], GroupOutcome::ForcedRenamed { .. }));
    assert_eq!(common::snapshot(root), before);

    Ok(())
}

#[test]
fn test_into_pass_report_withMixedOutcomes_shouldCountActions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_sized_file(root, "A.1.en.srt", 1000)?;
    common::create_sized_file(root, "A.2.en.srt", 100)?;
    common::create_sized_file(root, "B.1.en.srt", 1000)?;
    common::create_sized_file(root, "B.2.en.srt", 1000)?;
    common::create_sized_file(root, "C.1.en.srt", 1000)?;
    common::create_sized_file(root, "C.2.en.srt", 500)?;

    let languages = LanguageTable::default();
    let files = FileManager::new();
    let report = SubtitleClassifier::new(&languages, &files).run(root)?.into_pass_report();

    // three originals plus one forced track
    assert_eq!(report.renamed, 4);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.flagged, vec![root.join("C.2.en.srt")]);
    assert!(report.failures.is_empty());

    Ok(())
}
