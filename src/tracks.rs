//! JBrowse track-list assembly.
//!
//! Track lists are static configuration documents. The generic list carries
//! three REST-backed tracks with the genome id substituted into the store
//! URLs. The SARS-CoV-2 reference genome gets a curated inventory built from
//! constant tables: mutational-scanning signal tracks, variant constellation
//! feature tracks, UniProt-derived annotation tracks, and natural-selection
//! tracks generated over a month range.

use serde_json::{Value, json};

/// Genome served with the curated SARS-CoV-2 inventory instead of the
/// generic three-track list.
pub const SARS_GENOME_ID: &str = "2697049.107626";

const REST_STORE: &str = "p3/store/SeqFeatureREST";
const GFF_STORE: &str = "JBrowse/Store/SeqFeature/GFF3Tabix";
const CANVAS_TRACK: &str = "JBrowse/View/Track/CanvasFeatures";
const MULTI_BIGWIG_STORE: &str = "jbrowse.repo/plugins/MultiBigWig/js/Store/SeqFeature/MultiBigWig";
const MULTI_XYPLOT_TRACK: &str = "jbrowse.repo/plugins/MultiBigWig/js/View/Track/MultiWiggle/MultiXYPlot";
const MULTI_DENSITY_TRACK: &str = "jbrowse.repo/plugins/MultiBigWig/js/View/Track/MultiWiggle/MultiDensity";

const FEATURE_GLYPH: &str = r#"function(feature) { return "JBrowse/View/FeatureGlyph/" + ( {"gene": "Gene", "mRNA": "ProcessedTranscript", "transcript": "ProcessedTranscript", "segmented": "Segments" }[feature.get("type")] || "Box" ) }"#;
const DIALOG_ACTION: &str = "function(clickEvent){return window.featureDialogContent(this.feature);}";

/// Track descriptor for a genome. `api_url` is substituted into REST store
/// base URLs, `content_url` into static data file URLs.
pub fn track_list(genome_id: &str, api_url: &str, content_url: &str) -> Value {
    if genome_id == SARS_GENOME_ID {
        sars_track_list(api_url, content_url)
    } else {
        generic_track_list(genome_id, api_url)
    }
}

fn data_url(content_url: &str, file: &str) -> String {
    format!("{}/content/jbrowse/{}", content_url.trim_end_matches('/'), file)
}

fn generic_track_list(genome_id: &str, api_url: &str) -> Value {
    let base_url = format!("{api_url}/genome/{genome_id}");
    json!({
        "tracks": [
            {
                "type": "SequenceTrack",
                "storeClass": REST_STORE,
                "baseUrl": base_url,
                "key": "Reference Sequence",
                "label": "refseqs",
                "chunkSize": 20000,
                "maxExportSpan": 10000000,
                "region_stats": false,
                "pinned": true
            },
            {
                "type": CANVAS_TRACK,
                "storeClass": REST_STORE,
                "baseUrl": base_url,
                "key": "PATRIC Annotation",
                "label": "PATRICGenes",
                "query": { "annotation": "PATRIC" },
                "style": {
                    "showLabels": true,
                    "showTooltips": true,
                    "label": "patric_id,gene",
                    "color": "#17487d"
                },
                "glyph": FEATURE_GLYPH,
                "subfeatures": true,
                "onClick": {
                    "title": "{patric_id} {gene}",
                    "label": "<div style='line-height:1.7em'><b>{patric_id}</b> | {refseq_locus_tag} | {alt_locus_Tag} | {gene}<br>{product}<br>{type}: {start} .. {end} ({strand})<br> <i>Click for detailed information</i></div>",
                    "action": DIALOG_ACTION
                },
                "metadata": { "Description": "PATRIC annotated genes" },
                "maxExportFeatures": 10000,
                "maxExportSpan": 10000000,
                "chunkSize": 100000,
                "region_stats": true
            },
            {
                "category": "Gene and Protein",
                "type": CANVAS_TRACK,
                "storeClass": REST_STORE,
                "baseUrl": base_url,
                "query": { "annotation": "RefSeq" },
                "key": "RefSeq Annotation",
                "label": "RefSeqGenes",
                "style": {
                    "showLabels": true,
                    "showTooltips": true,
                    "className": "feature3",
                    "label": "refseq_locus_tag,gene,gene_id,protein_id,feature_type",
                    "color": "#4c5e22"
                },
                "glyph": FEATURE_GLYPH,
                "subfeatures": true,
                "onClick": {
                    "title": "{refseq_locus_tag} {gene}",
                    "label": "<div style='line-height:1.7em'><b>{refseq_locus_tag}</b> | {gene}<br>{product}<br>{type}: {start} .. {end} ({strand})<br> <i>Click for detailed information</i></div>",
                    "action": DIALOG_ACTION
                },
                "metadata": { "Description": "RefSeq annotated genes" },
                "maxExportFeatures": 10000,
                "maxExportSpan": 10000000,
                "region_stats": true
            }
        ],
        "names": { "url": "names/", "type": "REST" },
        "formatVersion": 1
    })
}

fn sars_track_list(api_url: &str, content_url: &str) -> Value {
    let mut tracks = vec![sars_reference_track(api_url), refseq_gff_track(content_url)];

    for pair in &ESCAPE_PAIRS[..10] {
        tracks.push(escape_pair_track(content_url, pair));
    }
    tracks.push(antibody_class_heatmap(content_url));
    tracks.push(class_summary_heatmap(content_url));
    tracks.push(ace2_binding_track(content_url));
    for pair in &ESCAPE_PAIRS[10..] {
        tracks.push(escape_pair_track(content_url, pair));
    }

    for &(key, label, file, description) in &WHO_VARIANTS {
        tracks.push(gff_track(
            content_url,
            "Variants by WHO Name",
            key,
            label,
            file,
            description,
            "uiprotColor(feature)",
            Some("normal"),
        ));
    }

    tracks.push(epitopes_track(content_url));
    tracks.push(primers_track(content_url));
    tracks.push(region_of_interest_track(content_url));
    for &(category, key, label, file, description, color, display_mode) in &UNIPROT_FEATURES {
        tracks.push(gff_track(content_url, category, key, label, file, description, color, display_mode));
    }

    let months = month_range();
    for polarity in &SELECTION_POLARITIES {
        for window in months.chunks(4) {
            tracks.push(selection_heatmap(content_url, polarity, window));
        }
    }
    for polarity in &SELECTION_POLARITIES {
        for &(year, month) in &months {
            tracks.push(selection_sites_track(content_url, polarity, year, month));
        }
    }

    for &(key, label, file, description) in &DRUG_RESISTANCE {
        tracks.push(gff_track(
            content_url,
            "Drug Resistant Mutations",
            key,
            label,
            file,
            description,
            "uiprotColor(feature)",
            Some("normal"),
        ));
    }

    json!({
        "formatVersion": 1,
        "names": { "type": "REST", "url": "names/" },
        "trackSelector": {
            "categoryOrder": "Gene and Protein, Variants by WHO Name, Mutational Scanning (Bloom Lab), Functional Features, Epitopes, Structural Features, Primers and Probes, Natural Selection Heatmaps (Pond Lab), Positive Selection Sites (Pond Lab), Negative Selection Sites (Pond Lab), Drug Resistant Mutations"
        },
        "include": data_url(content_url, "sars_colors.conf"),
        "tracks": tracks
    })
}

fn sars_reference_track(api_url: &str) -> Value {
    json!({
        "category": "Gene and Protein",
        "baseUrl": format!("{api_url}/genome/{SARS_GENOME_ID}"),
        "chunkSize": 20000,
        "key": "Reference Sequence",
        "label": "refseqs",
        "maxExportSpan": 10000000,
        "pinned": true,
        "region_stats": false,
        "storeClass": REST_STORE,
        "type": "SequenceTrack"
    })
}

fn refseq_gff_track(content_url: &str) -> Value {
    json!({
        "category": "Gene and Protein",
        "urlTemplate": data_url(content_url, "GCF_009858895.2_ASM985889v3_genomic.sorted.gff.gz"),
        "glyph": FEATURE_GLYPH,
        "key": "RefSeq Annotation",
        "label": "RefSeqGFF",
        "maxExportFeatures": 10000,
        "maxExportSpan": 10000000,
        "metadata": { "Description": "RefSeq annotated genes" },
        "region_stats": true,
        "storeClass": REST_STORE,
        "style": {
            "className": "feature3",
            "color": r#"function(feature) { return feature.get("feature_type")=="CDS" ? "darkred" : "darkorange"; }"#,
            "label": "product,protein_id,feature_type",
            "showLabels": true,
            "showTooltips": true
        },
        "subfeatures": true,
        "type": CANVAS_TRACK,
        "onClick": {
            "title": "{refseq_locus_tag} {gene}",
            "label": "<div style='line-height:1.7em'><b>{refseq_locus_tag}</b> | {gene}<br>{product}<br>{type}: {start} .. {end} ({strand})<br> <i>Click for detailed information</i></div>",
            "action": DIALOG_ACTION
        }
    })
}

/// Paired max/median BigWig overlay for one deep mutational scanning
/// experiment. The description text is assembled from a shared skeleton
/// since only the tested agent and the citation PMIDs differ per track.
struct EscapePair {
    key: &'static str,
    label: &'static str,
    stem: &'static str,
    agent: &'static str,
    source: &'static str,
    library_pmids: &'static str,
    escape_pmids: &'static str,
    subject: &'static str,
    escaper: &'static str,
}

const ESCAPE_PAIRS: [EscapePair; 12] = [
    EscapePair {
        key: "Polyclonal Sera Escape (Greaney 2021)",
        label: "Polyclonal Sera Escape",
        stem: "polyclonal",
        agent: "Polyclonal",
        source: "human sera",
        library_pmids: "33592168, 33495308",
        escape_pmids: "33592168, 33495308",
        subject: "human polyclonal serum",
        escaper: "the antibodies from human polyclonal plasma",
    },
    EscapePair {
        key: "Etesevimab Ab Escape (Starr 2021)",
        label: "Etesevimab Ab Escape",
        stem: "LY-CoV016",
        agent: "Etesevimab",
        source: "antibody",
        library_pmids: "33592168, 33495308",
        escape_pmids: "33592168, 33495308",
        subject: "the Eli Lilly Etesevimab therapuetic, which is the LYCoV016 monoclonal antibody",
        escaper: "the monoclonal antibody",
    },
    EscapePair {
        key: "Casirivimab Ab Escape (Starr 2021)",
        label: "Casirivimab Ab Escape",
        stem: "REGN10933",
        agent: "Casirivimab",
        source: "antibody",
        library_pmids: "33592168, 33495308",
        escape_pmids: "33592168, 33495308",
        subject: "the Regeneron Casirivimab therapuetic, which is the REGN10933 monoclonal antibody",
        escaper: "the monoclonal antibody",
    },
    EscapePair {
        key: "Imdevimab Ab Escape (Starr 2021)",
        label: "Imdevimab Ab Escape",
        stem: "REGN10987",
        agent: "Imdevimab",
        source: "antibody",
        library_pmids: "33592168, 33495308",
        escape_pmids: "33592168, 33495308",
        subject: "the Regeneron Imdevimab therapuetic, which is the REGN10987 monoclonal antibody",
        escaper: "the monoclonal antibody",
    },
    EscapePair {
        key: "Casirivimab+Imdevimab Ab Cocktail Escape (Starr 2021)",
        label: "Casirivimab+Imdevimab Ab Cocktail Escape",
        stem: "REGN10933_REGN10987",
        agent: "Casirivimab+Imdevimab cocktail",
        source: "antibody",
        library_pmids: "33592168, 33495308",
        escape_pmids: "33592168, 33495308",
        subject: "the Regeneron antibody cocktail, which contains the antibodies REGN10933+REGN10987",
        escaper: "the antibody cocktail",
    },
    EscapePair {
        key: "Bamlanivimab Ab Escape (Starr 2021)",
        label: "Bamlanivimab Ab Escape",
        stem: "LY-CoV555",
        agent: "Bamlanivimab",
        source: "antibody",
        library_pmids: "33655250, 33592168, 33495308",
        escape_pmids: "33655250, 33592168, 33495308",
        subject: "the Eli Lilly Bamlanivimab therapuetic, which is the LYCoV555 monoclonal antibody",
        escaper: "the monoclonal antibody",
    },
    EscapePair {
        key: "Etesevimab+Bamlanivimab Ab Cocktail Escape (Starr 2021)",
        label: "Etesevimab+Bamlanivimab Ab Cocktail Escape",
        stem: "LYCoV016_LYCoV555",
        agent: "Etesevimab+Bamlanivimab",
        source: "antibody",
        library_pmids: "33655250, 33592168, 33495308",
        escape_pmids: "33655250, 33592168, 33495308",
        subject: "the Eli Lilly antibody cocktail, which contains the antibodies LYCoV016+LYCoV555",
        escaper: "the antibody cocktail",
    },
    EscapePair {
        key: "AZD1061 Ab Escape (Dong 2021)",
        label: "AZD1061 Ab Escape",
        stem: "AZCoV22130",
        agent: "AZD1061",
        source: "antibody",
        library_pmids: "33532768, 33592168, 33495308",
        escape_pmids: "33532768, 33592168, 33495308",
        subject: "the AstraZeneca AZD1061 therapuetic, which is the COV2-2130 monoclonal antibody",
        escaper: "the monoclonal antibody",
    },
    EscapePair {
        key: "AZD8895 Ab Escape (Dong 2021)",
        label: "AZD8895 Ab Escape",
        stem: "AZCoV22196",
        agent: "AZD8895",
        source: "antibody",
        library_pmids: "33532768, 33592168, 33495308",
        escape_pmids: "33532768, 33592168, 33495308",
        subject: "the AstraZeneca AZD8895 therapuetic, which is the COV2-2196 monoclonal antibody",
        escaper: "the monoclonal antibody",
    },
    EscapePair {
        key: "AZD1061+AZD8895 Ab Escape (Dong 2021)",
        label: "AZD1061+AZD8895 Ab Escape",
        stem: "AZCoV22130_AZCoV22196",
        agent: "AZD1061+AZD8895",
        source: "antibody",
        library_pmids: "33532768, 33592168, 33495308",
        escape_pmids: "33532768, 33592168, 33495308",
        subject: "the AstraZeneca antibody cocktail, which contains the antibodies COV2-2130+COV2-2196",
        escaper: "the antibody cocktail",
    },
    EscapePair {
        key: "VIR-7831 Ab Escape (Starr 2021)",
        label: "VIR-7831 Ab Escape",
        stem: "S309",
        agent: "VIR-7831",
        source: "antibody",
        library_pmids: "33532768, 33592168, 33495308",
        escape_pmids: "33532768, 33592168, 33495308",
        subject: "the Vir Biotechnology VIR-7831 therapuetic, which is the 5309 monoclonal antibody",
        escaper: "the monoclonal antibody",
    },
    EscapePair {
        key: "Moderna Ab Escape (Greaney 2021)",
        label: "Moderna Ab Escape",
        stem: "moderna",
        agent: "Moderna",
        source: "human sera",
        library_pmids: "33592168, 33495308",
        escape_pmids: "33532768, 33592168, 33495308",
        subject: "serum antibodies elicited from the Moderna vaccine",
        escaper: "the Moderna vaccine elicted antibodies",
    },
];

fn escape_description(pair: &EscapePair) -> String {
    format!(
        "These data tracks were constructed from the {} escape data for the Spike protein \
         RBD Mutant library (PMID: 32841599). The mutant library was constructed such that \
         each site in the RBD was mutated with 19 different substitutions in the genetic \
         background of Wuhan-Hu-1. The resulting library covers 3804 of the 3819 possible \
         amino acid mutations in the RBD (PMID: {}). The height of the overlaid bar graph \
         at each position represents the maximum (blue) and median (orange) escape fraction \
         of all possible mutations at that position of the RBD when testing {}.  The escape \
         fraction refers to the proportion of yeast cells expressing the RBD mutation that \
         escape {} in vitro (PMID: {}).",
        pair.source, pair.library_pmids, pair.subject, pair.escaper, pair.escape_pmids,
    )
}

fn escape_pair_track(content_url: &str, pair: &EscapePair) -> Value {
    json!({
        "category": "Mutational Scanning (Bloom Lab)",
        "urlTemplates": [
            {
                "url": data_url(content_url, &format!("{}_max.bw", pair.stem)),
                "name": format!("{} escape fraction maximum", pair.agent),
                "nonCont": true,
                "fill": true,
                "color": "#85C1E9"
            },
            {
                "url": data_url(content_url, &format!("{}_median.bw", pair.stem)),
                "name": format!("{} escape fraction median", pair.agent),
                "nonCont": true,
                "fill": true,
                "color": "#E59866"
            }
        ],
        "storeClass": MULTI_BIGWIG_STORE,
        "autoscale": "global",
        "style": { "height": "100" },
        "max_score": "1",
        "colorizeAbout": "true",
        "key": pair.key,
        "label": pair.label,
        "type": MULTI_XYPLOT_TRACK,
        "metadata": { "description": escape_description(pair) }
    })
}

// (file, name, description, class color)
const CLASS_ANTIBODIES: [(&str, &str, &str, &str); 34] = [
    ("COV2-2165_max.bw", "COV2-2165", "Class 1: COV2-2165 escape max (Greaney 2021)", "#F5793A"),
    ("COV2-2196_norm_total.bw", "COV2-2196", "Class 1: COV2-2196 escape max (Dong 2021)", "#F5793A"),
    ("COV2-2832_max.bw", "COV2-2832", "Class 1: COV2-2832 escape max (Greaney 2021)", "#F5793A"),
    ("C105_max.bw", "C105", "Class 1: C105 escape max (Greaney 2021)", "#F5793A"),
    ("REGN10933_norm_total.bw", "REGN10933", "Class 1: REGN10933 escape (Starr 2021)", "#F5793A"),
    ("S2E12_max.bw", "S2E12", "Class 1: S2E12 escape max (Starr 2021)", "#F5793A"),
    ("S2H14_max.bw", "S2H14", "Class 1: S2H14 escape max (Starr 2021)", "#F5793A"),
    ("LY-CoV016_norm_total.bw", "LY-CoV016", "Class 1: LY-CoV016 escape max (Starr 2021)", "#F5793A"),
    ("COV2-2479_max.bw", "COV2-2479", "Class 2: COV2-2479 escape max (Greaney 2021)", "#A95AA1"),
    ("COV2-2050_max.bw", "COV2-2050", "Class 2: COV2-2050 escape max (Greaney 2021)", "#A95AA1"),
    ("COV2-2096_max.bw", "COV2-2096", "Class 2: COV2-2096 escape max (Greaney 2021)", "#A95AA1"),
    ("C002_max.bw", "C002", "Class 2: C002 escape max (Greaney 2021)", "#A95AA1"),
    ("C121_max.bw", "C121", "Class 2: C121 escape max (Greaney 2021)", "#A95AA1"),
    ("C144_max.bw", "C144", "Class 2: C144 escape max (Greaney 2021)", "#A95AA1"),
    ("LY-CoV555_norm_total.bw", "LY-CoV555", "Class 2: LY-CoV555 escape max (Starr 2021)", "#A95AA1"),
    ("S2X16_max.bw", "S2X16", "Class 2: S2X16 escape max (Starr 2021)", "#A95AA1"),
    ("S2H58_max.bw", "S2H58", "Class 2: S2H58 escape max (Starr 2021)", "#A95AA1"),
    ("S2H13_max.bw", "S2H13", "Class 2: S2H13 escape max (Starr 2021)", "#A95AA1"),
    ("S2D106_max.bw", "S2D106", "Class 2: S2D106 escape max (Starr 2021)", "#A95AA1"),
    ("S2X58_max.bw", "S2X58", "Class 2: S2X58 escape max (Starr 2021)", "#A95AA1"),
    ("COV2-2130_norm_total.bw", "COV2-2130", "Class 3: COV2-2130 escape max (Dong 2021)", "#85C0F9"),
    ("COV2-2499_max.bw", "COV2-2499", "Class 3: COV2-2499 escape max (Greaney 2021)", "#85C0F9"),
    ("C110_max.bw", "C110", "Class 3: C110 escape max (Greaney 2021)", "#85C0F9"),
    ("C135_max.bw", "C135", "Class 3: C135 escape max (Greaney 2021)", "#85C0F9"),
    ("REGN10987_norm_total.bw", "REGN10987", "Class 3: REGN10987 escape max (Starr 2021)", "#85C0F9"),
    ("S309_norm_total.bw", "S309", "Class 3: S309 escape max (Starr 2021)", "#85C0F9"),
    ("S2X227_max.bw", "S2X227", "Class 3: S2X227 escape max (Starr 2021)", "#85C0F9"),
    ("S2X259_max.bw", "S2X259", "Class 4: S2X259 escape max (Tortorici 2021)", "#CCBE9F"),
    ("S2X35_max.bw", "S2X35", "Class 4: S2X35 escape max (Starr 2021)", "#CCBE9F"),
    ("S304_max.bw", "S304", "Class 4: S304 escape max (Starr 2021)", "#CCBE9F"),
    ("S2H97_max.bw", "S2H97", "Class 4: S2H97 escape max (Starr 2021)", "#CCBE9F"),
    ("COV2-2094_max.bw", "COV2-2094", "Class 4: COV2-2094 escape max (Greaney 2021)", "#CCBE9F"),
    ("COV2-2082_max.bw", "COV2-2082", "Class 4: COV2-2082 escape max (Greaney 2021)", "#CCBE9F"),
    ("COV2-2677_max.bw", "COV2-2677", "Class 4: COV2-2677 escape max (Greaney 2021)", "#CCBE9F"),
];

const BY_CLASS_DESCRIPTION: &str = "These data tracks were constructed from the antibody escape data for the Spike protein RBD Mutant library (PMID: 32841599). The mutant library was constructed such that each site in the RBD was mutated with 19 different substitutions in the genetic background of Wuhan-Hu-1. The resulting library covers 3804 of the 3819 possible amino acid mutations in the RBD (PMID: 33532768, 33592168, 33495308).  This heatmap track analyzes mutational impact towards antibody binding for all monoclonal antibodies reported by the Jesse Bloom lab.  Since these monoclonal antibodies can be grouped by class, the antibodies are color coded by their class (PMID: 33045718).  The heat of each cell in this track denotes the normalized mutation impact sum (escape fraction) for all possible mutations at a particular site for a each antibody (PMID: 33592168). The escape fraction refers to the proportion of yeast cells expressing the RBD mutation that escape the monoclonal antibody in vitro (PMID: 33532768, 33592168, 33495308, 33851154, 33758856).";

fn antibody_class_heatmap(content_url: &str) -> Value {
    let lanes: Vec<Value> = CLASS_ANTIBODIES
        .iter()
        .map(|&(file, name, description, color)| {
            json!({
                "url": data_url(content_url, file),
                "name": name,
                "description": description,
                "nonCont": true,
                "fill": true,
                "color": color
            })
        })
        .collect();
    json!({
        "category": "Mutational Scanning (Bloom Lab)",
        "urlTemplates": lanes,
        "storeClass": MULTI_BIGWIG_STORE,
        "autoscale": "global",
        "style": { "height": "1000" },
        "max_score": "1",
        "colorizeAbout": "true",
        "showLabels": true,
        "showTooltips": true,
        "labelWidth": "80",
        "key": "Bloom Lab Antibodies by Class",
        "label": "Bloom Lab Antibodies by Class",
        "type": MULTI_DENSITY_TRACK,
        "metadata": { "description": BY_CLASS_DESCRIPTION }
    })
}

const CLASS_SUMMARY_DESCRIPTION: &str = "These data tracks were constructed from the antibody escape data for the Spike protein RBD Mutant library (PMID: 32841599). The mutant library was constructed such that each site in the RBD was mutated with 19 different substitutions in the genetic background of Wuhan-Hu-1. The resulting library covers 3804 of the 3819 possible amino acid mutations in the RBD (PMID: 33532768, 33592168, 33495308).  This heatmap track analyzes mutational impact towards antibody binding by class, where the class is defined by the structure of the antibody epitope (PMID: 33045718, 33758856).  Each of the four classes are comprised of multiple monoclonal antibodies, both therapuetic and non-therapuetic antibodies (those extracted from convalescent sera).  The heat at each site in this track denotes the maximum of the normalized mutation impact sum (escape fraction) among all antibodies within a class (PMID: 33592168). In other words, each cell within this heatmap represents the monoclonal antibody within the class that is most impacted by mutations overall at the particular site.  This way there is focus on the most vulnerable targets of SARS-CoV-2 RBD mutation.";

fn class_summary_heatmap(content_url: &str) -> Value {
    json!({
        "category": "Mutational Scanning (Bloom Lab)",
        "urlTemplates": [
            {
                "url": data_url(content_url, "class1_max_total_track.bw"),
                "name": "Class 1",
                "description": "ACE2 blocking antibodies that bind only to \"up\" RBDs (Barnes 2020)",
                "nonCont": true,
                "fill": true,
                "color": "#F5793A"
            },
            {
                "url": data_url(content_url, "class2_max_total_track.bw"),
                "name": "Class 2",
                "description": "ACE2 blocking antibodies that bind to both \"up\", \"down\", and contanct adjacent RBDs (Barnes 2020)",
                "nonCont": true,
                "fill": true,
                "color": "#A95AA1"
            },
            {
                "url": data_url(content_url, "class3_max_total_track.bw"),
                "name": "Class 3",
                "description": "Antibodies binding outside the ACE2 site and to \"up\" and \"down\" RBDs (Barnes 2020)",
                "nonCont": true,
                "fill": true,
                "color": "#85C0F9"
            },
            {
                "url": data_url(content_url, "class4_max_total_track.bw"),
                "name": "Class 4",
                "description": "Non-ACE2 blocking antibodies that bind only to \"up\" RBDs (Barnes 2020)",
                "nonCont": true,
                "fill": true,
                "color": "#CCBE9F"
            }
        ],
        "storeClass": MULTI_BIGWIG_STORE,
        "autoscale": "global",
        "style": { "height": "90", "textColor": "#FFFFFF" },
        "max_score": "1",
        "colorizeAbout": "true",
        "showLabels": true,
        "showTooltips": true,
        "labelWidth": "50",
        "key": "Classes 1-4 Ab Escape",
        "label": "Classes1to4AbEscape",
        "type": MULTI_DENSITY_TRACK,
        "metadata": { "description": CLASS_SUMMARY_DESCRIPTION }
    })
}

const ACE2_DESCRIPTION: &str = "These data tracks were constructed from the human sera escape data for the Spike protein RBD Mutant library (PMID: 32841599). The mutant library was constructed such that each site in the RBD was mutated with 19 different substitutions in the genetic background of Wuhan-Hu-1. The resulting library covers 3804 of the 3819 possible amino acid mutations in the RBD (PMID: 33592168, 33495308).  This particular track denotes the mutational impact towards ACE2 binding affinity. Bars in the positive region (blue) denote sites where a mutation can lead to increase in binding affinity, and bars in the negative region (red) denote sites where a mutation can lead to a decrease in binding affinity.  Note that each site only reports a positive binding affinity if the binding value was greater than or equal to 0.1, otherwise the minimum binding value is reported. Hence, all blue bars represent a maximum binding value at the site and all red bars represent a minimum binding value at the site (PMID: 32841599, 33592168, 33495308).";

fn ace2_binding_track(content_url: &str) -> Value {
    json!({
        "category": "Mutational Scanning (Bloom Lab)",
        "urlTemplates": [
            {
                "url": data_url(content_url, "ace2_binding_max.bw"),
                "name": "ACE2 Binding Affinity",
                "nonCont": true,
                "fill": true,
                "color": "#85C1E9"
            }
        ],
        "storeClass": MULTI_BIGWIG_STORE,
        "autoscale": "global",
        "style": { "height": "100", "pos_color": "blue", "neg_color": "red" },
        "max_score": "1",
        "colorizeAbout": "true",
        "key": "ACE2 Binding Affinity (Starr 2020)",
        "label": "ACE2 Binding Affinity",
        "type": "JBrowse/View/Track/Wiggle/XYPlot",
        "metadata": { "description": ACE2_DESCRIPTION }
    })
}

// (key, label, file, Description)
const WHO_VARIANTS: [(&str, &str, &str, &str); 25] = [
    ("Alpha", "AlphaAAVariations", "Alpha_variants.gff.gz", "Consensus variant constellation for Alpha"),
    ("Beta", "BetaAAVariations", "Beta_variants.gff.gz", "Consensus variant constellation for Beta"),
    ("Delta", "DeltaAAVariations", "Delta_variants.gff.gz", "Consensus variant constellation for Delta"),
    ("Epsilon", "EpsilonAAVariations", "Epsilon_variants.gff.gz", "Consensus variant constellation for Epsilon"),
    ("Eta", "EtaAAVariations", "Eta_variants.gff.gz", "Consensus variant constellation for Eta"),
    ("Gamma", "GammaAAVariations", "Gamma_variants.gff.gz", "Consensus variant constellation for Gamma"),
    ("Iota", "IotaAAVariations", "Iota_variants.gff.gz", "Consensus variant constellation for Iota"),
    ("Kappa", "KappaAAVariations", "Kappa_variants.gff.gz", "Consensus variant constellation for Kappa"),
    ("Mu", "MuAAVariations", "Mu_variants.gff.gz", "Consensus variant constellation for Mu"),
    ("No Class (B.1.617.3)", "NoneAAVariations", "None_variants.gff.gz", "Consensus variant constellation with no assigned class"),
    ("Omicron - BA.1", "OmicronBA.1AAVariations", "Omicron_BA.1+BA.1.*_variants.gff.gz", "Consensus variant constellation for Omicron BA.1"),
    ("Omicron - BA.2", "OmicronBA.2AAVariations", "Omicron_BA.2+BA.2*_variants.gff.gz", "Consensus variant constellation for Omicron BA.2"),
    ("Omicron - BA.2.12.1", "OmicronBA.2.12.1AAVariations", "Omicron_BA.2.12.1_variants.gff.gz", "Consensus variant constellation for Omicron BA.2.12.1"),
    ("Omicron - BA.3", "OmicronBA.3AAVariations", "Omicron_BA.3_variants.gff.gz", "Consensus variant constellation for Omicron BA.3"),
    ("Omicron - BA.4", "OmicronBA.4AAVariations", "Omicron_BA.4_variants.gff.gz", "Consensus variant constellation for Omicron BA.4"),
    ("Omicron - BA.5", "OmicronBA.5AAVariations", "Omicron_BA.5_variants.gff.gz", "Consensus variant constellation for Omicron BA.5"),
    ("Omicron - BA.2.75", "OmicronBA.2.75AAVariations", "Omicron_BA.2.75_variants.gff.gz", "Consensus variant constellation for Omicron BA.2.75"),
    ("Omicron - BA.4.6", "OmicronBA.4.6AAVariations", "Omicron_BA.4.6_variants.gff.gz", "Consensus variant constellation for Omicron BA.4.6"),
    ("Omicron - BQ.1", "OmicronBQ.1AAVariations", "Omicron_BQ.1_variants.gff.gz", "Consensus variant constellation for Omicron BQ.1"),
    ("Omicron - BQ.1.1", "OmicronBQ.1.1AAVariations", "Omicron_BQ.1.1_variants.gff.gz", "Consensus variant constellation for Omicron BQ.1.1"),
    ("Omicron - XBB", "OmicronXBBAAVariations", "Omicron_XBB_variants.gff.gz", "Consensus variant constellation for Omicron XBB"),
    ("Omicron - XBB.1", "OmicronXBB.1AAVariations", "Omicron_XBB.1_variants.gff.gz", "Consensus variant constellation for Omicron XBB.1"),
    ("Omicron - XBB.1.5", "OmicronXBB.1.5AAVariations", "Omicron_XBB.1.5_variants.gff.gz", "Consensus variant constellation for Omicron XBB.1.5"),
    ("Omicron - BF.7", "OmicronBF.7AAVariations", "Omicron_BF.7_variants.gff.gz", "Consensus variant constellation for Omicron BF.7"),
    ("Zeta", "ZetaAAVariations", "Zeta_variants.gff.gz", "Consensus variant constellation for Zeta"),
];

// (category, key, label, file, Description, color, displayMode)
#[rustfmt::skip]
const UNIPROT_FEATURES: [(&str, &str, &str, &str, &str, &str, Option<&str>); 20] = [
    ("Functional Features", "Topological Domain", "Topologicaldomain", "Topological_Domain.sorted.gff.gz", "Topological domain", "uniprotColor(feature)", None),
    ("Functional Features", "Metal Ion Binding Site", "Metalionbindingsite", "Metal_Ion_Binding_Site.sorted.gff.gz", "Metal ion binding site", "uniprotColor(feature)", None),
    ("Functional Features", "Transmembrane Region", "Transmembraneregion", "Transmembrane_Region.sorted.gff.gz", "Transmembrane region", "uniprotColor(feature)", None),
    ("Functional Features", "Chains", "Chains", "Chain.sorted.gff.gz", "Chains", "uniprotColor(feature)", None),
    ("Functional Features", "Mutagenesis Site", "MutagenesisSite", "Mutagenesis_Site.sorted.gff.gz", "Mutagenesis Site", "uniprotColor(feature)", Some("collapsed")),
    ("Functional Features", "Active Site", "Activesite", "Active_Site.sorted.gff.gz", "Active site", "uniprotColor(feature)", Some("compact")),
    ("Functional Features", "Modified Residue", "Modifiedresidue", "Modified_Residue.sorted.gff.gz", "Modified residue", "uniprotColor(feature)", None),
    ("Functional Features", "Repeat Region", "RepeatRegion", "Repeat_Region.sorted.gff.gz", "Repeat Region", "uniprotColor(feature)", None),
    ("Functional Features", "Nucleotide Phosphate Binding", "Nucleotidephosphatebinding", "Nucleotide_Phosphate_Binding.sorted.gff.gz", "Nucleotide phosphate binding", "uniprotColor(feature)", None),
    ("Functional Features", "Disulfide Bond", "Disulfidebond", "Disulfide_Bond.sorted.gff.gz", "Disulfide bond", "uniprotColor(feature)", None),
    ("Functional Features", "Short Motif", "Shortmotif", "Short_Motif.sorted.gff.gz", "Short motif", "uniprotColor(feature)", None),
    ("Functional Features", "Signal Peptide", "Signalpeptide", "Signal_Peptide.sorted.gff.gz", "Signal peptide", "uniprotColor(feature)", None),
    ("Structural Features", "Beta Strand", "Betastrand", "Beta_Strand.sorted.gff.gz", "Beta strand", "uniprotColor(feature)", None),
    ("Functional Features", "Zinc Finger", "Zincfinger", "Zinc_Finger.sorted.gff.gz", "Zinc finger", "uniprotColor(feature)", None),
    ("Structural Features", "Coiled Coil", "Coiledcoil", "Coiled_Coil.sorted.gff.gz", "Coiled coil", "uniprotColor(feature)", None),
    ("Functional Features", "Domains", "Domains", "Domains.sorted.gff.gz", "Domains", "uniprotColor(feature)", Some("compact")),
    ("Functional Features", "Glycosylation Site", "Glycosylationsite", "Glycosylation_Site.sorted.gff.gz", "Glycosylation site", "uniprotColor(feature)", None),
    ("Structural Features", "Helix", "HelixSecondaryStructure", "Helix.sorted.gff.gz", "Helix Secondary Structure", "uniprotColor(feature)", None),
    ("Functional Features", "Cleavage Sites", "CleavageSites", "Cleavage_Site.sorted.gff.gz", "Cleavage Sites", "uniprotColor(feature)", None),
    ("Structural Features", "Turn", "TurnSecondaryStructure", "Turn.sorted.gff.gz", "Turn Secondary Structure", "uniprotColor(feature)", None),
];

// (key, label, file, Description)
const DRUG_RESISTANCE: [(&str, &str, &str, &str); 3] = [
    (
        "3C Resistant Mutations",
        "DrugResistant3CMutations",
        "3C_resist.gff.gz",
        "Drug resistant 3C-like proteinase mutations.  These mutations on 3C-like proteinase have been experimentally shown to confer drug resistance against Paxlovid/Nirmatrelvir.",
    ),
    (
        "RdRp Resistant Mutations",
        "DrugResistantRdRpMutations",
        "resist.gff.gz",
        "Drug resistant RdRp mutations.  These mutations on the RdRp have been experimentally shown to confer drug resistance against Remdesivir.",
    ),
    (
        "Spike Resistant Mutations",
        "DrugResistantSpikeMutations",
        "s_resist.gff.gz",
        "Drug resistant Spike mutations.  These mutations on the Spike have been experimentally shown to confer drug resistance against Sotorvimab.",
    ),
];

#[allow(clippy::too_many_arguments)]
fn gff_track(
    content_url: &str,
    category: &str,
    key: &str,
    label: &str,
    file: &str,
    description: &str,
    color: &str,
    display_mode: Option<&str>,
) -> Value {
    let mut track = json!({
        "category": category,
        "maxExportFeatures": 10000,
        "style": {
            "className": "feature3",
            "color": color,
            "showLabels": true,
            "showTooltips": true,
            "borderWidth": 3
        },
        "storeClass": GFF_STORE,
        "urlTemplate": data_url(content_url, file),
        "maxExportSpan": 10000000,
        "label": label,
        "key": key,
        "type": CANVAS_TRACK,
        "metadata": { "Description": description }
    });
    if let (Some(mode), Some(obj)) = (display_mode, track.as_object_mut()) {
        obj.insert("displayMode".into(), Value::String(mode.into()));
    }
    track
}

fn epitopes_track(content_url: &str) -> Value {
    json!({
        "category": "Epitopes",
        "urlTemplate": data_url(content_url, "SARS_bcell_epitopes_human_02FEB2021_all_v3.sorted.gff.gz"),
        "storeClass": GFF_STORE,
        "type": CANVAS_TRACK,
        "key": "Antibody Epitopes",
        "label": "HumanBCellEpitopes",
        "maxExportFeatures": 10000,
        "maxExportSpan": 10000000,
        "metadata": { "Description": "Human BCell Epitopes" },
        "style": {
            "className": "feature3",
            "showLabels": true,
            "showTooltips": true,
            "borderWidth": 3,
            "color": "red"
        },
        "subfeatures": true,
        "glyph": "JBrowse/View/FeatureGlyph/Segments",
        "subParts": "epitope",
        "topLevelFeatures": "epitope_region",
        "displayMode": "collapsed"
    })
}

fn primers_track(content_url: &str) -> Value {
    json!({
        "category": "Primers and Probes",
        "urlTemplate": data_url(content_url, "SARS-CoV-2_Primers_Probes.sorted.gff.gz"),
        "storeClass": GFF_STORE,
        "type": CANVAS_TRACK,
        "key": "Primers and Probes",
        "label": "PrimersandProbes",
        "maxExportFeatures": 10000,
        "maxExportSpan": 10000000,
        "metadata": { "Description": "Primers and Probes" },
        "style": {
            "className": "feature3",
            "color": "voColor(feature.data.parent)",
            "showLabels": true,
            "showTooltips": true,
            "borderWidth": 3,
            "connectorColor": "linen",
            "label": "Variation"
        },
        "subfeatures": true,
        "glyph": "JBrowse/View/FeatureGlyph/Segments",
        "subParts": "CRISPR-Cas12,Multiplex_PCR,RT-dPCR,Singleplex_RT-PCR,MSSPE",
        "displayMode": "normal"
    })
}

fn region_of_interest_track(content_url: &str) -> Value {
    json!({
        "category": "Functional Features",
        "maxExportFeatures": 10000,
        "style": {
            "className": "feature3",
            "color": "blue",
            "showLabels": true,
            "showTooltips": true,
            "borderWidth": 3
        },
        "storeClass": GFF_STORE,
        "urlTemplate": data_url(content_url, "Region_of_Interest.sorted.gff.gz"),
        "maxExportSpan": 10000000,
        "label": "Regionofinterest",
        "key": "Region of Interest",
        "type": CANVAS_TRACK,
        "metadata": { "Description": "Region of Interest" },
        "subfeatures": true,
        "glyph": "JBrowse/View/FeatureGlyph/Segments",
        "subParts": "Region",
        "displayMode": "compact"
    })
}

struct SelectionPolarity {
    stem: &'static str,
    title: &'static str,
    color: &'static str,
    dnds: &'static str,
}

const SELECTION_POLARITIES: [SelectionPolarity; 2] = [
    SelectionPolarity { stem: "positive", title: "Positive", color: "#F5793A", dnds: "greater" },
    SelectionPolarity { stem: "negative", title: "Negative", color: "#A95AA1", dnds: "less" },
];

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// Selection data covers Feb 2020 through Jan 2022.
fn month_range() -> Vec<(u16, u8)> {
    let (mut year, mut month) = (2020u16, 2u8);
    let mut out = Vec::with_capacity(24);
    for _ in 0..24 {
        out.push((year, month));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    out
}

fn last_day(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        _ => 28,
    }
}

fn selection_file(stem: &str, year: u16, month: u8, ext: &str) -> String {
    format!("{stem}_selection_{year}-{month:02}-{:02}.{ext}", last_day(year, month))
}

fn selection_heatmap_description(polarity: &SelectionPolarity, first: (u16, u8), last: (u16, u8)) -> String {
    format!(
        "This track provides quantitative insight on the SARS-CoV-2 genomic sites that have \
         been under {stem} selection from {} {} - {} {}, according to the Pond lab \
         (https://github.com/spond/SARS-CoV-2-variation).  If a site was exhibiting {stem} \
         selection based on its dN/dS ratio being {dnds} than 1 for each month, a box in the \
         heatmap is shaded based on the -log10 of p-value of the FEL likelihood ratio test.  \
         A darker color indicates a more significant p-value, and therefore a site under \
         stronger {stem} selection, whereas no color indicates no significant selection.  \
         Only sites with a FEL p-value of 0.05 or less are shaded.",
        MONTH_ABBR[(first.1 - 1) as usize],
        first.0,
        MONTH_ABBR[(last.1 - 1) as usize],
        last.0,
        stem = polarity.stem,
        dnds = polarity.dnds,
    )
}

fn selection_heatmap(content_url: &str, polarity: &SelectionPolarity, window: &[(u16, u8)]) -> Value {
    let lanes: Vec<Value> = window
        .iter()
        .map(|&(year, month)| {
            json!({
                "url": data_url(content_url, &selection_file(polarity.stem, year, month, "bw")),
                "name": format!("{} {year}", MONTH_ABBR[(month - 1) as usize]),
                "description": "-Log10 FEL Likelihood Ratio Test Pvalue",
                "nonCont": true,
                "fill": true,
                "color": polarity.color
            })
        })
        .collect();
    let (first, last) = (window[0], window[window.len() - 1]);
    let key = format!(
        "{} Selection FEL Pvalue {}/{:02} - {}/{:02}",
        polarity.title, first.0, first.1, last.0, last.1,
    );
    json!({
        "category": "Natural Selection Heatmaps (Pond Lab)",
        "urlTemplates": lanes,
        "storeClass": MULTI_BIGWIG_STORE,
        "autoscale": "global",
        "style": { "height": "100" },
        "colorizeAbout": "true",
        "showLabels": true,
        "showTooltips": true,
        "labelWidth": "60",
        "key": key.clone(),
        "label": key,
        "type": MULTI_DENSITY_TRACK,
        "metadata": { "description": selection_heatmap_description(polarity, first, last) }
    })
}

fn selection_sites_track(content_url: &str, polarity: &SelectionPolarity, year: u16, month: u8) -> Value {
    json!({
        "category": format!("{} Selection Sites (Pond Lab)", polarity.title),
        "maxExportFeatures": 10000,
        "style": {
            "className": "feature3",
            "color": "uiprotColor(feature)",
            "showLabels": true,
            "showTooltips": true,
            "borderWidth": 3
        },
        "storeClass": GFF_STORE,
        "urlTemplate": data_url(content_url, &selection_file(polarity.stem, year, month, "gff.gz")),
        "maxExportSpan": 10000000,
        "label": format!("{}SelectionMarkers{month:02}/{year}", polarity.title),
        "key": format!("{year}-{month:02}"),
        "type": CANVAS_TRACK,
        "metadata": {
            "Description": format!("{} Selection Sites {month:02}/{year}", polarity.title)
        },
        "displayMode": "normal"
    })
}
