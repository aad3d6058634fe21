//! CYP2C19 convenience wrapper.

use crate::{
    err::PgxError,
    pgx::{input::VariantInput, loci::Gene, tables::ReferenceData},
};

use super::{interpret_star_gene, StarGeneResult};

/// Interpret CYP2C19; `None` if the curated tables are missing.
pub fn interpret_cyp2c19(
    input: &VariantInput,
    data: &ReferenceData,
) -> Result<Option<StarGeneResult>, PgxError> {
    interpret_star_gene(Gene::Cyp2c19, input, data)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::interpret_cyp2c19;
    use crate::pgx::{
        input::{GenotypeCall, VariantInput},
        phenotype::MetabolizerStatus,
        tables::ReferenceData,
    };

    #[test]
    fn het_star2_full() -> Result<(), anyhow::Error> {
        let input = VariantInput::full([("rs4244285", GenotypeCall::new("G", "A", "0/1"))]);

        let result = interpret_cyp2c19(&input, &ReferenceData::default())?.expect("tables");

        assert_eq!(result.diplotype, "*1/*2");
        assert_eq!(result.status, MetabolizerStatus::Intermediate);
        assert_eq!(result.status.to_string(), "intermediate_metabolizer");

        Ok(())
    }

    #[rstest::rstest]
    #[case(vec![], "*1/*1", MetabolizerStatus::Extensive)]
    #[case(vec![("rs4244285", "A")], "*1/*2", MetabolizerStatus::Intermediate)]
    #[case(vec![("rs12248560", "T")], "*1/*17", MetabolizerStatus::Extensive)]
    #[case(vec![("rs4244285", "A"), ("rs4986893", "A")], "*2/*3", MetabolizerStatus::Poor)]
    #[case(vec![("rs12248560", "T"), ("rs4244285", "A")], "*2/*17", MetabolizerStatus::Intermediate)]
    #[case(vec![("rs4244285", "G")], "*1/*1", MetabolizerStatus::Extensive)]
    fn simple_input(
        #[case] bases: Vec<(&str, &str)>,
        #[case] diplotype: &str,
        #[case] status: MetabolizerStatus,
    ) -> Result<(), anyhow::Error> {
        let result = interpret_cyp2c19(&VariantInput::simple(bases), &ReferenceData::default())?
            .expect("tables");

        assert_eq!(result.diplotype, diplotype);
        assert_eq!(result.status, status);

        Ok(())
    }

    #[test]
    fn hom_star17_full_is_ultra_rapid() -> Result<(), anyhow::Error> {
        let input = VariantInput::full([("rs12248560", GenotypeCall::new("C", "T", "1/1"))]);

        let result = interpret_cyp2c19(&input, &ReferenceData::default())?.expect("tables");

        assert_eq!(result.diplotype, "*17/*17");
        assert_eq!(result.phenotype, "Ultrarapid Metabolizer");
        assert_eq!(result.status, MetabolizerStatus::UltraRapid);

        Ok(())
    }

    #[rstest::rstest]
    #[case("rs12248560", "C", "T", "*17/*8", MetabolizerStatus::Intermediate)]
    #[case("rs4986893", "G", "A", "*3/*8", MetabolizerStatus::Poor)]
    #[case("rs28399504", "A", "G", "*4/*8", MetabolizerStatus::Poor)]
    fn star8_pairs_full(
        #[case] rsid: &str,
        #[case] reference: &str,
        #[case] alternative: &str,
        #[case] diplotype: &str,
        #[case] status: MetabolizerStatus,
    ) -> Result<(), anyhow::Error> {
        let input = VariantInput::full([
            ("rs41291556", GenotypeCall::new("T", "C", "0/1")),
            (rsid, GenotypeCall::new(reference, alternative, "0/1")),
        ]);

        let result = interpret_cyp2c19(&input, &ReferenceData::default())?.expect("tables");

        assert_eq!(result.diplotype, diplotype);
        assert_eq!(result.status, status);

        Ok(())
    }

    #[rstest::rstest]
    #[case(vec![("rs41291556", "C"), ("rs12248560", "T")], "*8/*17", MetabolizerStatus::Intermediate)]
    #[case(vec![("rs41291556", "C"), ("rs4244285", "A")], "*2/*8", MetabolizerStatus::Poor)]
    fn star8_pairs_simple(
        #[case] bases: Vec<(&str, &str)>,
        #[case] diplotype: &str,
        #[case] status: MetabolizerStatus,
    ) -> Result<(), anyhow::Error> {
        let result = interpret_cyp2c19(&VariantInput::simple(bases), &ReferenceData::default())?
            .expect("tables");

        assert_eq!(result.diplotype, diplotype);
        assert_eq!(result.status, status);

        Ok(())
    }

    #[test]
    fn missing_tables() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let input = VariantInput::simple([("rs4244285", "A")]);

        let result = interpret_cyp2c19(&input, &ReferenceData::new(tmp_dir.to_path_buf()))?;

        assert!(result.is_none());

        Ok(())
    }
}
