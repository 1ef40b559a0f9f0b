mod pipeline_scenarios;
mod retrieval_ranking;
